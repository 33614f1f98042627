//! The `neuromaster init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("neuromaster.toml").exists() {
        println!("neuromaster.toml already exists, skipping.");
    } else {
        std::fs::write("neuromaster.toml", SAMPLE_CONFIG)?;
        println!("Created neuromaster.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY, or edit neuromaster.toml");
    println!("  2. Run: neuromaster order");
    println!("  3. Run: neuromaster clinical");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# neuromaster configuration

default_provider = "gemini"
# stats_dir = "~/.local/share/neuromaster"
# image_dir = "/tmp/neuromaster-images"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"
# text_model = "gemini-2.5-flash"
# image_model = "gemini-2.5-flash-image"

[providers.offline]
type = "offline"
"#;
