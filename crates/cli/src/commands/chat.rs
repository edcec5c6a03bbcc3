//! `carebot chat`: interactive or single-message chat mode.

use super::{load_config, load_knowledge, print_recommendations};
use carebot_agent::{
    DialogueEngine, EntityExtractor, Persona, PromptAssembler, PromptInput, TurnReply,
};
use carebot_config::{AppConfig, ConfigError};
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    dry_run: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let knowledge = load_knowledge(&config)?;

    if dry_run {
        // No backend involved: show the first-turn prompt for the message.
        let text = message.unwrap_or_default();
        let persona = PromptAssembler::render_persona(&Persona::from_config(&config.chatbot));
        let summary = knowledge.render_summary();
        let context = EntityExtractor::new(&knowledge).extract(&text);
        println!(
            "{}",
            PromptAssembler::assemble(&PromptInput {
                persona: &persona,
                knowledge_summary: &summary,
                context: context.as_ref(),
                history: &[],
                user_message: &text,
            })
        );
        return Ok(());
    }

    let provider = match carebot_providers::build_from_config(&config) {
        Ok(provider) => provider,
        Err(ConfigError::MissingApiKey(name)) => {
            print_key_help(&name);
            return Err("No API key found. See above for setup instructions.".into());
        }
        Err(e) => return Err(e.into()),
    };

    let mut engine = DialogueEngine::from_config(&config, knowledge, provider)?;

    if let Some(msg) = message {
        // Single message mode
        let turn = engine.handle_turn(&msg).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&turn)?);
        } else {
            println!("{}", turn.reply);
            print_recommendations(&turn.recommendations);
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        CareBot: Asisten Informasi Kesehatan  ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.provider);
    println!("  Model:     {}", config.model);
    println!(
        "  Katalog:   {} fasilitas, {} dokter",
        engine.knowledge().facilities().len(),
        engine.knowledge().doctor_count()
    );
    println!("  Sesi:      {}", engine.session_id());
    println!();
    println!("  Ketik pesan lalu tekan Enter.");
    println!("  /clear menghapus riwayat, /temp <0.0-1.0> mengubah temperatur.");
    println!("  Ketik 'exit' atau Ctrl+C untuk keluar.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    show_prompt()?;

    while let Some(line) = lines.next_line().await? {
        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Exit => break,
            ChatCommand::Clear => {
                engine.clear_history();
                println!("  Riwayat percakapan dihapus.\n");
            }
            ChatCommand::Temperature(Some(t)) => match engine.set_temperature(t) {
                Ok(()) => println!("  Temperatur diubah ke {t}.\n"),
                Err(e) => eprintln!("  [Error] {e}\n"),
            },
            ChatCommand::Temperature(None) => {
                eprintln!("  Gunakan: /temp <angka antara 0.0 dan 1.0>\n");
            }
            ChatCommand::Message(text) => {
                eprint!("  ...");
                let turn = engine.handle_turn(text).await;
                eprint!("\r     \r");
                print_turn(&turn);
            }
        }
        show_prompt()?;
    }

    println!();
    println!("  Sampai jumpa! 👋");
    println!();

    Ok(())
}

fn show_prompt() -> std::io::Result<()> {
    print!("  Anda > ");
    std::io::stdout().flush()
}

fn print_turn(turn: &TurnReply) {
    println!();
    for line in turn.reply.lines() {
        println!("  CareBot > {line}");
    }
    print_recommendations(&turn.recommendations);
    println!();
}

fn print_key_help(provider: &str) {
    eprintln!();
    eprintln!("  ERROR: No API key configured for '{provider}'!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    CAREBOT_API_KEY=...   (any provider)");
    eprintln!("    GEMINI_API_KEY=...    (Google Gemini, default)");
    eprintln!("    OPENAI_API_KEY=...    (OpenAI-compatible endpoints)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
}

/// One line of interactive input.
#[derive(Debug, PartialEq)]
enum ChatCommand<'a> {
    Empty,
    Exit,
    Clear,
    Temperature(Option<f32>),
    Message(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            "exit" | "quit" | "/exit" | "/quit" => Self::Exit,
            "/clear" | "/reset" => Self::Clear,
            _ => match line.strip_prefix("/temp") {
                Some(rest) if rest.is_empty() || rest.starts_with(' ') => {
                    Self::Temperature(rest.trim().parse().ok())
                }
                _ => Self::Message(line),
            },
        }
    }
}
