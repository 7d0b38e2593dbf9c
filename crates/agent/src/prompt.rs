//! System prompt construction
//!
//! The context prompt instructs the model on receptionist behavior and
//! the JSON summary contract, and carries the doctor roster snapshot
//! captured at session start.

use receptionist_core::Doctor;

/// Base receptionist instructions, including the summary contract the
/// Structured-Block Extractor depends on.
pub const SYSTEM_PROMPT: &str = r#"You are an AI voice receptionist for a Bangladeshi dental chamber.
Your job is to speak clearly in Bangla and help callers with:

1. Booking new appointments
2. Rescheduling appointments
3. Cancelling appointments
4. General dental inquiries
5. Complaints or issues

Rules:
- Always speak in natural Bangla.
- Keep replies polite, short, and friendly.
- Ask follow-up questions only when needed.
- Confirm date, time, patient name, and phone number before booking.

At the end of the call (or when asked to summarize), produce 3 outputs in JSON (exact keys):
{
"bangla_notes": "<short summary in Bangla>",
"english_notes": "<translation of the same summary in English>",
"appointment_data": {
"patient_name": "...",
"phone": "...",
"date": "YYYY-MM-DD",
"time": "HH:MM",
"purpose": "...",
"urgency_level": "low|medium|high",
"doctor_name": "..."
}
}

If no appointment was booked, return appointment_data as null.
If any information is not available, leave it as an empty string.
Never use English when speaking to the caller. Use English only for the "english_notes" value.

Additional rules for phone conversations:
- Be extra clear and speak slowly
- If the caller doesn't respond, ask them to repeat
- Keep conversations focused and efficient
- Always confirm important information like dates, times, and names
- End calls politely with a thank you message"#;

/// Sentinel used when the roster snapshot is empty
pub const NO_DOCTORS: &str = "No doctors are currently available at this chamber.";

/// Render the roster as a human-readable list, one doctor per line
pub fn render_roster(roster: &[Doctor]) -> String {
    if roster.is_empty() {
        return NO_DOCTORS.to_string();
    }

    roster
        .iter()
        .map(|doctor| format!("Dr. {}: {}", doctor.name, doctor.specialty))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full context prompt for a session: base instructions plus
/// the roster snapshot.
pub fn build_context_prompt(roster: &[Doctor]) -> String {
    format!(
        "{}\n\nDoctors available for appointments:\n{}",
        SYSTEM_PROMPT,
        render_roster(roster)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_rendering() {
        let roster = vec![
            Doctor::new("Rahman", "Orthodontics"),
            Doctor::new("Akter", "Pediatric dentistry"),
        ];
        let rendered = render_roster(&roster);
        assert_eq!(
            rendered,
            "Dr. Rahman: Orthodontics\nDr. Akter: Pediatric dentistry"
        );
    }

    #[test]
    fn test_empty_roster_sentinel() {
        assert_eq!(render_roster(&[]), NO_DOCTORS);
    }

    #[test]
    fn test_context_prompt_carries_roster() {
        let roster = vec![Doctor::new("Rahman", "Orthodontics")];
        let prompt = build_context_prompt(&roster);
        assert!(prompt.contains("Dr. Rahman: Orthodontics"));
        assert!(prompt.contains("appointment_data"));
    }
}
