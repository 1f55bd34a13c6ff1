use clap::{Parser, Subcommand, ValueEnum};
use ctakes_core::{
    config::verify_spans_from_env_value, constants::ENV_VERIFY_SPANS, map_polarity,
    AnnotationIndex, CoreConfig, Polarity, PolarityResponse, Span, TransformerModel,
};
use fhir::{Bundle, FhirProjector, NlpSource};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ctakes-fhir")]
#[command(about = "cTAKES annotation and FHIR projection CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a cTAKES response and print it in canonical form
    Normalize {
        /// cTAKES REST response JSON (`-` for stdin)
        input: PathBuf,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Convert UTF-16 offsets of a response to character offsets of its document
    Reconcile {
        /// Source document text
        #[arg(long)]
        document: PathBuf,
        /// cTAKES REST response JSON (`-` for stdin)
        input: PathBuf,
        /// Skip the check that every mention matches the document text
        #[arg(long)]
        no_verify: bool,
        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// Project a response onto a FHIR collection Bundle
    Fhir {
        /// Source document text
        #[arg(long)]
        document: PathBuf,
        /// cTAKES REST response JSON (`-` for stdin)
        input: PathBuf,
        /// Patient id
        #[arg(long)]
        subject: String,
        /// Encounter id
        #[arg(long)]
        encounter: String,
        /// DocumentReference id
        #[arg(long)]
        docref: String,
        /// Which mentions to project
        #[arg(long, value_enum, default_value_t = PolarityFilter::Positive)]
        polarity: PolarityFilter,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// NLP algorithm recorded in the nlp-source extension
        #[arg(long)]
        algorithm: Option<String>,
        /// NLP version recorded in the nlp-source extension
        #[arg(long)]
        nlp_version: Option<String>,
    },
    /// Map a cNLP transformer response onto the spans that were sent
    Polarity {
        /// Transformer response JSON, `{"statuses": [..]}` (`-` for stdin)
        input: PathBuf,
        /// Span sent to the service, as `begin:end`; repeat in request order
        #[arg(long = "span", value_parser = parse_span, required = true)]
        spans: Vec<Span>,
        /// Model that produced the statuses
        #[arg(long, value_enum, default_value_t = ModelArg::Negation)]
        model: ModelArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolarityFilter {
    Positive,
    Negated,
    Any,
}

impl PolarityFilter {
    fn as_polarity(self) -> Option<Polarity> {
        match self {
            Self::Positive => Some(Polarity::Positive),
            Self::Negated => Some(Polarity::Negated),
            Self::Any => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModelArg {
    Negation,
    Termexists,
}

impl From<ModelArg> for TransformerModel {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::Negation => TransformerModel::Negation,
            ModelArg::Termexists => TransformerModel::TermExists,
        }
    }
}

#[derive(Serialize)]
struct SpanPolarity {
    begin: usize,
    end: usize,
    polarity: Polarity,
}

fn parse_span(value: &str) -> Result<Span, String> {
    let (begin, end) = value
        .split_once(':')
        .ok_or_else(|| format!("expected begin:end, got '{value}'"))?;
    let begin: usize = begin
        .trim()
        .parse()
        .map_err(|e| format!("invalid begin '{begin}': {e}"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|e| format!("invalid end '{end}': {e}"))?;
    Span::new(begin, end).map_err(|e| e.to_string())
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
}

fn render(value: &serde_json::Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        Ok(value.to_string())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ctakes_fhir=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let verify_spans = verify_spans_from_env_value(std::env::var(ENV_VERIFY_SPANS).ok())?;

    match cli.command {
        Commands::Normalize { input, pretty } => {
            let index = AnnotationIndex::parse(&read_input(&input)?)?;
            println!("{}", render(&index.as_json(), pretty)?);
        }
        Commands::Reconcile {
            document,
            input,
            no_verify,
            pretty,
        } => {
            let cfg = CoreConfig::new(verify_spans && !no_verify);
            let document = std::fs::read_to_string(document)?;
            let index = ctakes_core::extract(&document, &read_input(&input)?, &cfg)?;
            println!("{}", render(&index.as_json(), pretty)?);
        }
        Commands::Fhir {
            document,
            input,
            subject,
            encounter,
            docref,
            polarity,
            format,
            algorithm,
            nlp_version,
        } => {
            let cfg = CoreConfig::new(verify_spans);
            let document = std::fs::read_to_string(document)?;
            let index = ctakes_core::extract(&document, &read_input(&input)?, &cfg)?;

            let projector = FhirProjector::new(&subject, &encounter, &docref)?
                .with_source(NlpSource::from_env_values(algorithm, nlp_version));
            let bundle =
                Bundle::collection(projector.project_index_with(&index, polarity.as_polarity()));
            tracing::info!(resources = bundle.total, "built FHIR bundle");

            match format {
                OutputFormat::Json => println!("{}", bundle.render_json()?),
                OutputFormat::Yaml => print!("{}", bundle.render_yaml()?),
            }
        }
        Commands::Polarity {
            input,
            spans,
            model,
        } => {
            let response = PolarityResponse::parse(&read_input(&input)?)?;
            let mapped = map_polarity(&spans, &response, model.into())?;
            let out: Vec<SpanPolarity> = mapped
                .into_iter()
                .map(|(span, polarity)| SpanPolarity {
                    begin: span.begin(),
                    end: span.end(),
                    polarity,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spans() {
        assert_eq!(parse_span("3:5").expect("valid span").key(), (3, 5));
        assert_eq!(parse_span(" 8 : 13 ").expect("valid span").key(), (8, 13));
        assert!(parse_span("3-5").is_err());
        assert!(parse_span("9:3").is_err());
        assert!(parse_span("a:3").is_err());
    }

    #[test]
    fn fhir_defaults_to_positive_json() {
        let cli = Cli::try_parse_from([
            "ctakes-fhir",
            "fhir",
            "--document",
            "note.txt",
            "--subject",
            "1234",
            "--encounter",
            "5678",
            "--docref",
            "ABCD",
            "response.json",
        ])
        .expect("valid arguments");
        match cli.command {
            Commands::Fhir {
                polarity, format, ..
            } => {
                assert_eq!(polarity, PolarityFilter::Positive);
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(polarity.as_polarity(), Some(Polarity::Positive));
            }
            _ => panic!("expected fhir subcommand"),
        }
    }

    #[test]
    fn polarity_requires_spans() {
        let err = Cli::try_parse_from(["ctakes-fhir", "polarity", "statuses.json"]);
        assert!(err.is_err());

        let cli = Cli::try_parse_from([
            "ctakes-fhir",
            "polarity",
            "--span",
            "3:5",
            "--span",
            "8:13",
            "--model",
            "termexists",
            "-",
        ])
        .expect("valid arguments");
        match cli.command {
            Commands::Polarity { spans, model, .. } => {
                assert_eq!(spans.len(), 2);
                assert_eq!(TransformerModel::from(model), TransformerModel::TermExists);
            }
            _ => panic!("expected polarity subcommand"),
        }
    }

    #[test]
    fn any_polarity_disables_filter() {
        assert_eq!(PolarityFilter::Any.as_polarity(), None);
    }
}
