//! Prompt assembly for a single completion call.
//!
//! The prompt is built from up to five sections, always in this order:
//!
//! | Section | Present when |
//! |---------|--------------|
//! | Persona instructions | always |
//! | Knowledge summary | always |
//! | `[INFORMASI DOKTER TERKAIT]` | extraction found a doctor |
//! | `[RIWAYAT PERCAKAPAN]` | the history window is non-empty |
//! | `User: …` / `Assistant:` | always, last |
//!
//! # Determinism
//!
//! Assembly is a pure function of its input: identical inputs always
//! produce byte-identical prompts. Nothing time-dependent or random is read.

use crate::context::extractor::ExtractedContext;
use carebot_config::{ChatbotConfig, Style};
use carebot_core::message::ConversationTurn;

// ── Persona ───────────────────────────────────────────────────────────────

/// Assistant persona: communication style plus domain label.
#[derive(Debug, Clone, PartialEq)]
pub struct Persona {
    pub style: Style,
    pub domain: String,
}

impl Persona {
    pub fn new(style: Style, domain: impl Into<String>) -> Self {
        Self {
            style,
            domain: domain.into(),
        }
    }

    pub fn from_config(config: &ChatbotConfig) -> Self {
        Self::new(config.style, config.domain.clone())
    }

    /// Render the instruction block every prompt starts with.
    pub fn render(&self) -> String {
        format!(
            "Anda adalah asisten AI customer service yang ramah dan profesional untuk layanan kesehatan.\n\
             Tugas Anda adalah membantu pasien dengan:\n\
             \n\
             1. Mencari informasi ketersediaan dokter di rumah sakit\n\
             2. Menjelaskan gejala penyakit dan memberikan saran awal\n\
             3. Memberikan informasi jadwal praktik dokter\n\
             4. Menjawab pertanyaan umum tentang kesehatan\n\
             \n\
             Gaya komunikasi: {style}\n\
             Domain: {domain}\n\
             \n\
             Penting:\n\
             - Selalu gunakan bahasa Indonesia\n\
             - Bersikap empati dan ramah\n\
             - Jika tidak yakin, sarankan untuk berkonsultasi langsung dengan dokter\n\
             - Jangan memberikan diagnosis medis definitif\n\
             - Berikan informasi yang akurat dan mudah dipahami",
            style = self.style.label(),
            domain = self.domain,
        )
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::from_config(&ChatbotConfig::default())
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────

/// Everything that goes into one prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    /// Rendered persona instructions.
    pub persona: &'a str,
    /// Rendered facility catalog.
    pub knowledge_summary: &'a str,
    pub context: Option<&'a ExtractedContext>,
    /// Recent turns, oldest first. Empty when memory is disabled.
    pub history: &'a [ConversationTurn],
    pub user_message: &'a str,
}

pub struct PromptAssembler;

impl PromptAssembler {
    pub const KNOWLEDGE_HEADER: &'static str = "Informasi Rumah Sakit dan Dokter yang tersedia:";
    pub const CONTEXT_HEADER: &'static str = "[INFORMASI DOKTER TERKAIT]";
    pub const HISTORY_HEADER: &'static str = "[RIWAYAT PERCAKAPAN]";

    pub fn render_persona(persona: &Persona) -> String {
        persona.render()
    }

    /// Build the prompt text.
    pub fn assemble(input: &PromptInput<'_>) -> String {
        let mut sections = vec![
            input.persona.trim_end().to_string(),
            format!(
                "{}\n{}",
                Self::KNOWLEDGE_HEADER,
                input.knowledge_summary.trim_end()
            ),
        ];

        if let Some(ctx) = input.context {
            sections.push(Self::render_context(ctx));
        }

        if !input.history.is_empty() {
            sections.push(Self::render_history(input.history));
        }

        sections.push(format!("User: {}\nAssistant:", input.user_message));
        sections.join("\n\n")
    }

    fn render_context(ctx: &ExtractedContext) -> String {
        format!(
            "{header}\n\
             Dokter: {name}\n\
             Rumah Sakit: {facility}\n\
             Spesialisasi: {specialty}\n\
             Jadwal: {schedule}\n\
             Status: {status}\n\
             Alamat RS: {address}\n\
             Telepon RS: {phone}",
            header = Self::CONTEXT_HEADER,
            name = ctx.doctor.name,
            facility = ctx.facility,
            specialty = ctx.doctor.specialty,
            schedule = ctx.doctor.schedule_line(),
            status = ctx.doctor.availability_label(),
            address = ctx.facility_address,
            phone = ctx.facility_phone,
        )
    }

    fn render_history(history: &[ConversationTurn]) -> String {
        let turns: Vec<String> = history
            .iter()
            .map(|t| format!("User: {}\nAssistant: {}", t.user(), t.assistant()))
            .collect();
        format!("{}\n{}", Self::HISTORY_HEADER, turns.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::extractor::MatchSource;
    use carebot_knowledge::{Doctor, Specialty};

    const SUMMARY: &str = "RS Siloam:\n  Alamat: Jl. Garnisun\n";

    fn context() -> ExtractedContext {
        ExtractedContext {
            doctor: Doctor {
                name: "Dr. Indah Permata, Sp.KK".into(),
                specialty: Specialty::KulitDanKelamin,
                schedule: vec!["Selasa: 09:00-13:00".into(), "Kamis: 14:00-18:00".into()],
                available: true,
            },
            facility: "RS Siloam".into(),
            facility_address: "Jl. Garnisun Dalam No. 8".into(),
            facility_phone: "021-29962888".into(),
            matched_by: MatchSource::Keyword("kulit"),
        }
    }

    fn input<'a>(
        persona: &'a str,
        context: Option<&'a ExtractedContext>,
        history: &'a [ConversationTurn],
        user_message: &'a str,
    ) -> PromptInput<'a> {
        PromptInput {
            persona,
            knowledge_summary: SUMMARY,
            context,
            history,
            user_message,
        }
    }

    #[test]
    fn persona_renders_style_and_domain() {
        let formal = Persona::new(Style::Formal, "kesehatan anak").render();
        assert!(formal.contains("Gaya komunikasi: formal"));
        assert!(formal.contains("Domain: kesehatan anak"));

        let casual = Persona::default().render();
        assert!(casual.contains("Gaya komunikasi: santai"));
        assert!(casual.contains("Domain: kesehatan"));
    }

    #[test]
    fn persona_keeps_safety_rules() {
        let persona = Persona::default().render();
        assert!(persona.starts_with(
            "Anda adalah asisten AI customer service yang ramah dan profesional untuk layanan kesehatan.\n\
             Tugas Anda adalah membantu pasien dengan:\n\n\
             1. Mencari informasi ketersediaan dokter di rumah sakit\n"
        ));
        assert!(persona.contains(
            "Domain: kesehatan\n\n\
             Penting:\n\
             - Selalu gunakan bahasa Indonesia\n\
             - Bersikap empati dan ramah\n\
             - Jika tidak yakin, sarankan untuk berkonsultasi langsung dengan dokter\n\
             - Jangan memberikan diagnosis medis definitif\n\
             - Berikan informasi yang akurat dan mudah dipahami"
        ));
        assert!(persona.ends_with("mudah dipahami"));
    }

    #[test]
    fn minimal_prompt_has_persona_summary_and_message() {
        let persona = Persona::default().render();
        let prompt = PromptAssembler::assemble(&input(&persona, None, &[], "Halo"));

        assert!(prompt.starts_with("Anda adalah asisten AI customer service"));
        assert!(prompt.contains(PromptAssembler::KNOWLEDGE_HEADER));
        assert!(prompt.contains("RS Siloam:"));
        assert!(!prompt.contains(PromptAssembler::CONTEXT_HEADER));
        assert!(!prompt.contains(PromptAssembler::HISTORY_HEADER));
        assert!(prompt.ends_with("\n\nUser: Halo\nAssistant:"));
    }

    #[test]
    fn context_block_lists_doctor_details() {
        let ctx = context();
        let prompt = PromptAssembler::assemble(&input("persona", Some(&ctx), &[], "dokter kulit?"));

        assert!(prompt.contains(
            "[INFORMASI DOKTER TERKAIT]\n\
             Dokter: Dr. Indah Permata, Sp.KK\n\
             Rumah Sakit: RS Siloam\n\
             Spesialisasi: Kulit dan Kelamin\n\
             Jadwal: Selasa: 09:00-13:00, Kamis: 14:00-18:00\n\
             Status: Tersedia\n\
             Alamat RS: Jl. Garnisun Dalam No. 8\n\
             Telepon RS: 021-29962888"
        ));
    }

    #[test]
    fn unavailable_doctor_is_marked() {
        let mut ctx = context();
        ctx.doctor.available = false;
        let prompt = PromptAssembler::assemble(&input("persona", Some(&ctx), &[], "x"));
        assert!(prompt.contains("Status: Tidak Tersedia"));
    }

    #[test]
    fn history_is_rendered_oldest_first() {
        let history = vec![
            ConversationTurn::new("halo", "Halo juga!"),
            ConversationTurn::new("jadwal?", "Senin pagi."),
        ];
        let prompt = PromptAssembler::assemble(&input("persona", None, &history, "terima kasih"));

        assert!(prompt.contains(
            "[RIWAYAT PERCAKAPAN]\nUser: halo\nAssistant: Halo juga!\nUser: jadwal?\nAssistant: Senin pagi."
        ));
        assert!(prompt.ends_with("User: terima kasih\nAssistant:"));
    }

    #[test]
    fn sections_keep_fixed_order() {
        let ctx = context();
        let history = vec![ConversationTurn::new("a", "b")];
        let prompt = PromptAssembler::assemble(&input("PERSONA", Some(&ctx), &history, "pesan"));

        let persona = prompt.find("PERSONA").unwrap();
        let knowledge = prompt.find(PromptAssembler::KNOWLEDGE_HEADER).unwrap();
        let doctor = prompt.find(PromptAssembler::CONTEXT_HEADER).unwrap();
        let history = prompt.find(PromptAssembler::HISTORY_HEADER).unwrap();
        let message = prompt.rfind("User: pesan").unwrap();
        assert!(persona < knowledge && knowledge < doctor && doctor < history && history < message);
    }

    #[test]
    fn assembly_is_deterministic() {
        let ctx = context();
        let history = vec![ConversationTurn::new("a", "b"), ConversationTurn::new("c", "d")];
        let persona = Persona::new(Style::Formal, "kesehatan").render();
        let input = input(&persona, Some(&ctx), &history, "sama");

        assert_eq!(PromptAssembler::assemble(&input), PromptAssembler::assemble(&input));
    }
}
