use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ar,
}

impl Lang {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Lang::En),
            "ar" => Some(Lang::Ar),
            _ => None,
        }
    }
}

// key, english, arabic
const TRANSLATIONS: &[(&str, &str, &str)] = &[
    ("men", "Men", "رجال"),
    ("women", "Women", "نساء"),
    ("yes", "Yes", "نعم"),
    ("no", "No", "لا"),
    ("cat10cups", "10 Cups Package", "باقة 10 أكواب"),
    ("cat20cups", "20 Cups Package", "باقة 20 كوب"),
    ("cat30cups", "30 Cups Package", "باقة 30 كوب"),
    ("cat50cups", "50 Cups Package", "باقة 50 كوب"),
    ("cat80cups", "80 Cups Package", "باقة 80 كوب"),
    ("cat100cups", "100 Cups Package", "باقة 100 كوب"),
    ("cat150cups", "150 Cups Package", "باقة 150 كوب"),
    ("cat300cups", "300 Cups Package", "باقة 300 كوب"),
    ("catIceCreamServings", "Ice Cream Package", "باقة الآيس كريم"),
    ("cupsLabel", "{count} cups", "{count} كوب"),
    ("servingsLabel", "{count} servings", "{count} حصة"),
    ("durationLabel", "Duration: {hours} hour(s)", "المدة: {hours} ساعة"),
    ("booked", "Booked", "محجوز"),
    (
        "bookingConfirmation",
        "Booking confirmed!",
        "تم تأكيد الحجز!",
    ),
    (
        "bookingConfirmationMessage",
        "Your booking for {date} at {startTime} is confirmed.",
        "تم تأكيد حجزك ليوم {date} الساعة {startTime}.",
    ),
    (
        "bookingFailedMessage",
        "Booking failed. Please try again.",
        "فشل الحجز. يرجى المحاولة مرة أخرى.",
    ),
    (
        "slotTakenMessage",
        "That time slot is already booked.",
        "هذا الموعد محجوز بالفعل.",
    ),
];

/// Look up a key and substitute `{placeholder}` parameters. Unknown keys
/// echo the key itself, matching the original form's behavior.
pub fn translate(lang: Lang, key: &str, params: &[(&str, &str)]) -> String {
    let mut text = TRANSLATIONS
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, en, ar)| match lang {
            Lang::En => (*en).to_string(),
            Lang::Ar => (*ar).to_string(),
        })
        .unwrap_or_else(|| key.to_string());

    for (name, value) in params {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}
