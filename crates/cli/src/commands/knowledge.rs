//! `carebot knowledge`: print the catalog, or show what a message matches.

use super::{load_config, load_knowledge};
use carebot_agent::{EntityExtractor, MatchSource};

pub async fn run(find: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let knowledge = load_knowledge(&config)?;

    let Some(query) = find else {
        match &config.knowledge_path {
            Some(path) => println!("  Katalog: {}\n", path.display()),
            None => println!("  Katalog: bawaan\n"),
        }
        print!("{}", knowledge.render_summary());
        return Ok(());
    };

    match EntityExtractor::new(&knowledge).extract(&query) {
        Some(ctx) => {
            let matched_by = match ctx.matched_by {
                MatchSource::Name => "nama dokter".to_string(),
                MatchSource::Keyword(keyword) => format!("kata kunci '{keyword}'"),
            };
            println!("  Dokter:        {}", ctx.doctor.name);
            println!("  Spesialisasi:  {}", ctx.doctor.specialty);
            println!("  Rumah Sakit:   {}", ctx.facility);
            println!("  Jadwal:        {}", ctx.doctor.schedule_line());
            println!("  Status:        {}", ctx.doctor.availability_label());
            println!("  Alamat RS:     {}", ctx.facility_address);
            println!("  Telepon RS:    {}", ctx.facility_phone);
            println!("  Cocok lewat:   {matched_by}");
        }
        None => println!("  Tidak ada dokter yang cocok dengan \"{query}\"."),
    }

    Ok(())
}
