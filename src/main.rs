use clap::Parser;
use env_logger::Env;
use log::LevelFilter;
use synergy::application::{
    check_expr, check_expressions, extract_text, BuildEdgesService, BuildIndexService,
    ConfigService, EdgeOptions, EditTagsService, GenerateOptions, GenerateTagsService, TagChange,
    TagEdit,
};
use synergy::cli::{self, Cli, Commands};
use synergy::domain::card::CardType;
use synergy::domain::tags::{EffectSource, TAG_KINDS};
use synergy::error::SynergyError;
use synergy::infrastructure::FileSystemRepository;
use std::str::FromStr;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = run(cli);

    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if cli.quiet {
        builder.filter_level(LevelFilter::Warn);
    }
    builder
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

fn parse_changes(raw: &[String]) -> Result<Vec<TagChange>, SynergyError> {
    raw.iter()
        .map(|r| {
            TagChange::parse(r).map_err(|message| SynergyError::InvalidExpression {
                input: r.clone(),
                errors: vec![message],
            })
        })
        .collect()
}

fn run(cli: Cli) -> Result<(), SynergyError> {
    let config = ConfigService::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Tags {
            cards,
            output,
            overrides,
            existing,
        } => {
            let service = GenerateTagsService::new(FileSystemRepository::new());
            let report = service.execute(&GenerateOptions {
                cards,
                output,
                overrides,
                existing,
                extract: config.config().extract.clone(),
            })?;
            println!("{}", cli::format_generate_report(&report));
            Ok(())
        }
        Commands::Index {
            tags,
            output,
            source,
        } => {
            let source = EffectSource::from_str(&source).map_err(SynergyError::Config)?;
            let service = BuildIndexService::new(FileSystemRepository::new());
            let artifact = service.execute(&tags, &output, source)?;
            println!("{}", cli::format_index_summary(&artifact));
            Ok(())
        }
        Commands::Edges {
            tags,
            cards,
            output,
            leader_traits,
        } => {
            let service = BuildEdgesService::new(FileSystemRepository::new());
            let artifact = service.execute(&EdgeOptions {
                tags,
                cards,
                output,
                leader_traits,
                graph: config.into_config().graph,
            })?;
            println!("{}", cli::format_graph_summary(&artifact));
            Ok(())
        }
        Commands::Extract {
            text,
            trigger,
            card_type,
        } => {
            let card_type = CardType::parse(&card_type);
            if !card_type.is_known() {
                return Err(SynergyError::Config(
                    "Card type must be one of: leader, character, event, stage".to_string(),
                ));
            }
            let extraction = extract_text(
                &text,
                trigger.as_deref(),
                card_type,
                &config.config().extract,
            );
            println!("{}", cli::format_extraction(&extraction));
            Ok(())
        }
        Commands::Check { exprs } => {
            let checks = check_expressions(&exprs);
            print!("{}", cli::format_checks(&checks));
            check_expr::first_failure(&checks)
        }
        Commands::Tag {
            store,
            card_id,
            add,
            remove,
            reviewed,
            note,
        } => {
            let edit = TagEdit {
                add: parse_changes(&add)?,
                remove: parse_changes(&remove)?,
                reviewed: reviewed.then_some(true),
                note,
            };
            let service = EditTagsService::new(FileSystemRepository::new());
            service.execute(&store, &card_id, &edit)?;
            println!("Updated {}", card_id);
            Ok(())
        }
        Commands::Kinds => {
            print!("{}", cli::format_kinds(TAG_KINDS));
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.show()?);
            Ok(())
        }
    }
}
