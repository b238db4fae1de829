use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Editor, FuzzySelect, Input, theme::ColorfulTheme};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use mailforge::Config;
use mailforge::backend::{RefinementKind, create_backend};
use mailforge::draft::Phase;
use mailforge::engine::WorkflowEngine;
use mailforge::notify::create_notifier;
use mailforge::params::{EmailParameters, Length, OutputFormat, ParamField, Tone};

#[derive(Parser)]
#[command(name = "mailforge", version, about = "AI-assisted email drafting workflow")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive drafting session (default)
    Repl,
    /// Generate one draft and print it to stdout
    Generate {
        /// Free-text context for the email body
        #[arg(long)]
        context: Option<String>,
        /// professional | friendly | formal | casual
        #[arg(long)]
        tone: Option<String>,
        /// short | medium | long
        #[arg(long)]
        length: Option<String>,
        /// markdown | html | plain
        #[arg(long)]
        format: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();
    let config = Config::load_or_init()?;
    config.validate()?;

    let backend = create_backend(&config)?;
    let notifier = create_notifier(&config.notifier.backend);
    let mut params = EmailParameters::sample();
    params.set_temperature(config.default_temperature);
    let mut engine = WorkflowEngine::new(backend, notifier, params);

    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => repl(&mut engine).await,
        Command::Generate {
            context,
            tone,
            length,
            format,
        } => generate_once(&mut engine, context, tone, length, format).await,
    }
}

async fn generate_once(
    engine: &mut WorkflowEngine,
    context: Option<String>,
    tone: Option<String>,
    length: Option<String>,
    format: Option<String>,
) -> Result<()> {
    if let Some(context) = context {
        engine.params_mut().set(ParamField::EmailContext, context);
    }
    if let Some(tone) = tone {
        engine.params_mut().tone = tone.parse::<Tone>().context("unknown tone")?;
    }
    if let Some(length) = length {
        engine.params_mut().length = length.parse::<Length>().context("unknown length")?;
    }
    if let Some(format) = format {
        engine.params_mut().output_format =
            format.parse::<OutputFormat>().context("unknown format")?;
    }

    // A missing model list is not fatal; the backend may resolve a default.
    let _ = engine.load_models().await;
    engine.generate().await?;
    println!("{}", engine.draft().content);
    Ok(())
}

async fn repl(engine: &mut WorkflowEngine) -> Result<()> {
    println!(
        "{}",
        style("mailforge — type `help` for commands, `quit` to exit").bold()
    );
    let _ = engine.load_models().await;

    loop {
        let line: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("mailforge")
            .allow_empty(true)
            .interact_text()?;
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let rest = words.collect::<Vec<_>>().join(" ");

        // Engine operations report their own failures through the notifier;
        // the loop just keeps the session alive.
        match command {
            "" => {}
            "generate" | "g" => {
                let _ = engine.generate().await;
            }
            "refine" | "r" => match rest.parse::<RefinementKind>() {
                Ok(kind) => {
                    let _ = engine.refine(kind).await;
                }
                Err(_) => println!("usage: refine <professional|shorter|personalized|improvement>"),
            },
            "score" | "s" => {
                if engine.score().await.is_ok() {
                    print_score(engine);
                }
            }
            "improve" | "i" => {
                let _ = engine.auto_improve().await;
            }
            "edit" | "e" => edit_draft(engine)?,
            "show" => print_draft(engine),
            "models" => {
                for model in engine.models() {
                    println!("  {}", model.name);
                }
            }
            "model" | "m" => select_model(engine)?,
            "set" => set_param(engine, &rest),
            "help" | "h" => print_help(),
            "quit" | "q" | "exit" => break,
            other => println!("unknown command: {other} (try `help`)"),
        }
    }
    Ok(())
}

fn edit_draft(engine: &mut WorkflowEngine) -> Result<()> {
    let current = engine.draft().content.clone();
    if let Some(edited) = Editor::new().edit(&current)? {
        if let Err(err) = engine.edit_draft(edited) {
            println!("{err}");
        }
    }
    Ok(())
}

fn select_model(engine: &mut WorkflowEngine) -> Result<()> {
    let names: Vec<String> = engine.models().iter().map(|m| m.name.clone()).collect();
    if names.is_empty() {
        println!("no models fetched; is the backend reachable?");
        return Ok(());
    }
    let choice = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("model")
        .items(&names)
        .default(0)
        .interact()?;
    engine.select_model(&names[choice]);
    Ok(())
}

fn set_param(engine: &mut WorkflowEngine, rest: &str) {
    let Some((key, value)) = rest.split_once(' ') else {
        println!("usage: set <tone|length|format|temperature|context> <value>");
        return;
    };
    let params = engine.params_mut();
    let outcome = match key {
        "tone" => value.parse::<Tone>().map(|v| params.tone = v).map_err(|_| ()),
        "length" => value
            .parse::<Length>()
            .map(|v| params.length = v)
            .map_err(|_| ()),
        "format" => value
            .parse::<OutputFormat>()
            .map(|v| params.output_format = v)
            .map_err(|_| ()),
        "temperature" => value
            .parse::<f64>()
            .map(|v| params.set_temperature(v))
            .map_err(|_| ()),
        "context" => {
            params.set(ParamField::EmailContext, value);
            Ok(())
        }
        _ => Err(()),
    };
    if outcome.is_err() {
        println!("could not set `{key}` to `{value}`");
    }
}

fn print_draft(engine: &WorkflowEngine) {
    let draft = engine.draft();
    if !draft.has_been_generated {
        println!("no draft yet — run `generate` first");
        return;
    }
    println!(
        "{} ({}, phase {:?})",
        style("current draft").bold(),
        draft.format,
        engine.phase()
    );
    println!("{}", draft.content);
}

fn print_score(engine: &WorkflowEngine) {
    if engine.phase() != Phase::Scored {
        return;
    }
    let card = engine.score_card();
    println!("{}", style("AI score").bold());
    println!("  subject line     {:>4}/10", card.subject_line);
    println!("  writing style    {:>4}/10", card.writing_style);
    println!("  content          {:>4}/10", card.content);
    println!("  structure        {:>4}/10", card.structure);
    println!("  personalization  {:>4}/10", card.personalization);
    println!("{}", style("suggestions").bold());
    println!("{}", card.suggestions);
}

fn print_help() {
    println!(
        "  generate            build a fresh draft from the parameters\n\
         \x20 refine <kind>       professional | shorter | personalized | improvement\n\
         \x20 score               evaluate the draft and show the score card\n\
         \x20 improve             apply the scorer's suggestions\n\
         \x20 edit                open the draft in $EDITOR\n\
         \x20 show                print the current draft\n\
         \x20 models              list available models\n\
         \x20 model               pick a model\n\
         \x20 set <key> <value>   tone, length, format, temperature, context\n\
         \x20 quit"
    );
}
