use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;

use crate::config::GenieConfig;
use crate::huggingface::InferenceClient;
use crate::language::Language;
use crate::model::{CodeResult, Task};
use crate::orchestrator::Orchestrator;
use crate::share::{parse_share_url, share_url, DEFAULT_SHARE_BASE};
use crate::templates::{self, CodeTemplate};
use crate::ui::{GenieUI, UiOptions};
use crate::GenieError;

#[derive(Parser, Clone)]
#[command(name = "codegenie", author, version, about, long_about = None)]
pub enum GenieCLIArgs {
    /// Generate code from a description, then explain it
    Generate(GenerateArgs),
    /// Fix existing code, then explain the fixed version
    Debug(CodeArgs),
    /// Explain existing code
    Explain(CodeArgs),
    /// Open the terminal interface
    Interactive(InteractiveArgs),
    /// Check that the access token is accepted by the endpoint
    ValidateToken(ConnectionArgs),
    /// List the built-in code templates or print one of them
    Templates(TemplatesArgs),
    /// Build a share link for some code, or decode one
    Share(ShareArgs),
}

#[derive(clap::Args, Clone)]
pub struct ConnectionArgs {
    /// YAML configuration file (defaults to ./codegenie.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Access token, overrides HUGGINGFACE_TOKEN and the configuration file
    #[arg(long)]
    token: Option<String>,
}

#[derive(clap::Args, Clone)]
pub struct OutputArgs {
    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write the resulting code to this file
    #[arg(long)]
    output_file: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
pub struct GenerateArgs {
    #[arg(long, value_enum, default_value = "python")]
    language: Language,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// What the code should do
    #[arg(required = true, num_args = 1..)]
    description: Vec<String>,
}

#[derive(clap::Args, Clone)]
pub struct CodeArgs {
    #[arg(long, value_enum, default_value = "python")]
    language: Language,

    /// Source file to read, stdin when absent
    #[arg(long)]
    file: Option<PathBuf>,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args, Clone)]
pub struct InteractiveArgs {
    #[arg(long, value_enum, default_value = "python")]
    language: Language,

    /// Prefill the input box with the contents of this file
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// Write accepted code to this file
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Print accepted code to stdout on exit
    #[arg(long)]
    write_stdout: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(clap::Args, Clone)]
pub struct TemplatesArgs {
    #[arg(long, value_enum)]
    language: Option<Language>,

    /// Print the code of the template with this name
    #[arg(long)]
    name: Option<String>,

    /// Print the matching templates as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Clone)]
pub struct ShareArgs {
    #[arg(long, value_enum, default_value = "python")]
    language: Language,

    /// Source file to share, stdin when absent
    #[arg(long)]
    file: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_SHARE_BASE)]
    base_url: String,

    /// Decode this share link instead of creating one
    #[arg(long)]
    open: Option<String>,
}

impl ConnectionArgs {
    fn client(&self) -> Result<InferenceClient, GenieError> {
        let config = GenieConfig::resolve(self.config.as_deref(), self.token.clone())?;
        InferenceClient::new(&config)
    }
}

fn read_source(file: Option<&Path>) -> Result<String, GenieError> {
    match file {
        Some(file) => Ok(fs::read_to_string(file)?),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn render_result(result: &CodeResult, task: Task, language: Language) -> String {
    match task {
        Task::Explain => result.explanation.clone(),
        Task::Generate | Task::Debug => format!(
            "```{}\n{}\n```\n\n{}",
            language.fence_tag(),
            result.code,
            result.explanation
        ),
    }
}

async fn run_task(
    task: Task,
    input: &str,
    language: Language,
    connection: &ConnectionArgs,
    output: &OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let orchestrator = Orchestrator::new(connection.client()?);
    let result = orchestrator.run(task, input, language).await?;
    if let Some(file) = &output.output_file {
        fs::write(file, &result.code)?;
    }
    if output.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_result(&result, task, language));
    }
    Ok(())
}

fn select_templates(args: &TemplatesArgs) -> Result<Vec<&'static CodeTemplate>, GenieError> {
    if let Some(name) = &args.name {
        let template = templates::find(name, args.language)
            .ok_or_else(|| GenieError::Validation(format!("no template named {name}")))?;
        return Ok(vec![template]);
    }
    Ok(templates::CODE_TEMPLATES
        .iter()
        .filter(|template| args.language.map_or(true, |language| template.language == language))
        .collect())
}

fn print_templates(args: &TemplatesArgs) -> Result<(), Box<dyn std::error::Error>> {
    let selected = select_templates(args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }
    if args.name.is_some() {
        for template in selected {
            println!("{}", template.code);
        }
        return Ok(());
    }
    for template in selected {
        println!(
            "{:<12}{:<26}{}",
            template.language.id(),
            template.name,
            template.description
        );
    }
    Ok(())
}

fn share(args: &ShareArgs) -> Result<(), GenieError> {
    if let Some(link) = &args.open {
        let (language, code) = parse_share_url(link)?;
        eprintln!("language: {language}");
        println!("{code}");
        return Ok(());
    }
    let code = read_source(args.file.as_deref())?;
    println!("{}", share_url(&args.base_url, &code, args.language)?);
    Ok(())
}

#[allow(clippy::missing_errors_doc)]
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = GenieCLIArgs::parse();
    match args {
        GenieCLIArgs::Generate(args) => {
            let description = args.description.join(" ");
            run_task(
                Task::Generate,
                &description,
                args.language,
                &args.connection,
                &args.output,
            )
            .await?;
        }
        GenieCLIArgs::Debug(args) => {
            let code = read_source(args.file.as_deref())?;
            run_task(Task::Debug, &code, args.language, &args.connection, &args.output).await?;
        }
        GenieCLIArgs::Explain(args) => {
            let code = read_source(args.file.as_deref())?;
            run_task(Task::Explain, &code, args.language, &args.connection, &args.output).await?;
        }
        GenieCLIArgs::Interactive(args) => {
            let orchestrator = Arc::new(Orchestrator::new(args.connection.client()?));
            let options = UiOptions {
                language: args.language,
                input_file: args.input_file,
                output_file: args.output_file,
                write_stdout: args.write_stdout,
            };
            let mut ui = GenieUI::new(orchestrator, options)?;
            ui.run().await?;
        }
        GenieCLIArgs::ValidateToken(args) => {
            let client = args.client()?;
            client.validate().await?;
            println!("Token is valid for {}", client.endpoint());
        }
        GenieCLIArgs::Templates(args) => print_templates(&args)?,
        GenieCLIArgs::Share(args) => share(&args)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{render_result, select_templates, GenieCLIArgs};
    use crate::language::Language;
    use crate::model::{CodeResult, Task};

    #[test]
    fn generate_joins_words() {
        let args = GenieCLIArgs::try_parse_from([
            "codegenie",
            "generate",
            "--language",
            "cpp",
            "reverse",
            "a",
            "string",
        ])
        .unwrap();
        match args {
            GenieCLIArgs::Generate(args) => {
                assert_eq!(args.language, Language::Cpp);
                assert_eq!(args.description.join(" "), "reverse a string");
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn generate_needs_a_description() {
        assert!(GenieCLIArgs::try_parse_from(["codegenie", "generate"]).is_err());
    }

    #[test]
    fn language_defaults_to_python() {
        let args = GenieCLIArgs::try_parse_from(["codegenie", "explain", "--file", "a.py"]).unwrap();
        match args {
            GenieCLIArgs::Explain(args) => assert_eq!(args.language, Language::Python),
            _ => panic!("expected explain"),
        }
    }

    #[test]
    fn templates_as_json() {
        let args = GenieCLIArgs::try_parse_from([
            "codegenie",
            "templates",
            "--language",
            "go",
            "--json",
        ])
        .unwrap();
        let GenieCLIArgs::Templates(args) = args else {
            panic!("expected templates");
        };
        assert!(args.json);
        let selected = select_templates(&args).unwrap();
        let json = serde_json::to_value(&selected).unwrap();
        assert_eq!(json[0]["name"], "HTTP Handler");
        assert_eq!(json[0]["language"], "go");
        assert!(json[0]["code"].as_str().unwrap().starts_with("package main"));
    }

    #[test]
    fn rendering_per_task() {
        let result = CodeResult {
            code: "print(1)".into(),
            explanation: "Prints one.".into(),
        };
        assert_eq!(
            render_result(&result, Task::Generate, Language::Python),
            "```python\nprint(1)\n```\n\nPrints one."
        );
        assert_eq!(
            render_result(&result, Task::Explain, Language::Python),
            "Prints one."
        );
    }
}
