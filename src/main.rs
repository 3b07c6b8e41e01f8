use clap::Parser;
use form_autofill::cli::commands::{cmd_extract, cmd_fill, cmd_serve, cmd_suggest};
use form_autofill::cli::config::{Cli, Commands, load_config, resolve_settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // CLI > config > defaults
    let settings = resolve_settings(&cli, &config);

    match cli.command {
        Commands::Extract { page, output } => {
            cmd_extract(&page, output.as_deref(), &settings).await?;
        }
        Commands::Fill {
            page,
            response,
            format,
            output,
        } => {
            let format = format.unwrap_or_else(|| config.fill.format.clone());
            let all_filled =
                cmd_fill(&page, &response, &format, output.as_deref(), &settings).await?;
            if !all_filled {
                std::process::exit(1);
            }
        }
        Commands::Suggest {
            page,
            analyzer,
            output,
        } => {
            let analyzer = analyzer.unwrap_or_else(|| config.suggest.analyzer.clone());
            let all_filled = cmd_suggest(&page, &analyzer, output.as_deref(), &settings).await?;
            if !all_filled {
                std::process::exit(1);
            }
        }
        Commands::Serve { page } => {
            cmd_serve(&page, &settings).await?;
        }
    }

    Ok(())
}
