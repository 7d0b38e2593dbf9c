//! Fixed caller-facing messages
//!
//! Callers hear Bangla only; no raw error text ever reaches them.

use receptionist_core::AppointmentField;

/// Greeting / acknowledgment spoken when a session opens
pub const GREETING: &str =
    "হ্যালো! আমি ডেন্টাল চেম্বারের ভয়েস রেসেপশনিস্ট। আপনাকে কিভাবে সাহায্য করতে পারি?";

/// Caller-side seed that opens the conversation context
pub const CALLER_SEED: &str = "হ্যালো, আমি ডেন্টাল চেম্বারে কল করেছি।";

/// Spoken when the caller's utterance was empty or unintelligible
pub const PLEASE_REPEAT: &str =
    "দুঃখিত, আমি বুঝতে পারিনি। অনুগ্রহ করে আবার বলুন।";

/// Spoken when the dialogue model fails; the session continues
pub const GENERATION_APOLOGY: &str =
    "দুঃখিত, কিছু সমস্যা হয়েছে। অনুগ্রহ করে আবার চেষ্টা করুন।";

/// Substitute reply when stripping the block left nothing speakable
/// but an appointment draft was extracted
pub const APPOINTMENT_CONFIRMED: &str = "আপনার অ্যাপয়েন্টমেন্ট নিশ্চিত করা হয়েছে।";

/// Spoken when the dialogue collaborator is not configured at all
pub const SERVICE_UNAVAILABLE: &str =
    "দুঃখিত, সিস্টেমে কিছু সমস্যা হয়েছে। অনুগ্রহ করে পরে আবার চেষ্টা করুন।";

/// Closing message on farewell or end of exchange
pub const GOODBYE: &str = "ধন্যবাদ আপনার জন্য। আবার কল করুন!";

/// Voicemail message played when the caller stays silent
pub const VOICEMAIL: &str =
    "আপনি নীরব ছিলেন, তাই কলটি শেষ করা হচ্ছে। প্রয়োজনে আবার কল করুন। ধন্যবাদ!";

/// Ask the caller for exactly the details a partial draft still lacks
pub fn missing_fields_prompt(fields: &[AppointmentField]) -> String {
    let labels = fields
        .iter()
        .map(|field| field.caller_label())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "অ্যাপয়েন্টমেন্ট নিশ্চিত করতে অনুগ্রহ করে আপনার {} শেয়ার করুন।",
        labels
    )
}
