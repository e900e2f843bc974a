//! DocFetch CLI - fetch web content and document text, or serve the HTTP API

mod serve;

use clap::{Args, Parser, Subcommand, ValueEnum};
use docfetch::{
    ExtractionRequest, FetchOptions, FetchRequest, FetchResult, Pipeline, API_LLMTXT,
    DEFAULT_USER_AGENT,
};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How `fetch` prints its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Render {
    /// Text preceded by a YAML metadata block
    #[value(name = "md")]
    Frontmatter,
    /// The full result object
    Json,
}

/// DocFetch - robots-aware web content and document text retrieval
#[derive(Parser, Debug)]
#[command(name = "docfetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full API documentation (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

/// Options shared by every subcommand that talks to the network
#[derive(Args, Debug, Clone)]
struct ClientArgs {
    /// Default User-Agent
    #[arg(long, env = "DOCFETCH_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-call timeout in seconds
    #[arg(long, env = "DOCFETCH_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Largest response body accepted, in bytes
    #[arg(long, env = "DOCFETCH_MAX_BODY_BYTES", default_value_t = docfetch::client::DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Deny the fetch when robots.txt cannot be retrieved
    #[arg(long, env = "DOCFETCH_ROBOTS_FAIL_CLOSED")]
    robots_fail_closed: bool,
}

impl ClientArgs {
    fn options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            max_body_bytes: self.max_body_bytes,
            robots_fail_open: !self.robots_fail_closed,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),
    /// Fetch URL and output as markdown with metadata frontmatter
    Fetch {
        /// URL to fetch
        url: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = Render::Frontmatter)]
        output: Render,

        /// Return HTML verbatim instead of markdown
        #[arg(long)]
        raw: bool,

        /// Skip the robots.txt check
        #[arg(long)]
        ignore_robots: bool,

        #[command(flatten)]
        client: ClientArgs,
    },
    /// Download a PDF or DOCX document and print its text
    Extract {
        /// Document URL
        url: String,

        /// Document type: pdf or docx
        #[arg(long = "type", short = 't')]
        doc_type: String,

        #[command(flatten)]
        client: ClientArgs,
    },
    /// Print JSON Schemas of the API request bodies
    Schema,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        emit(API_LLMTXT);
        std::process::exit(0);
    }

    init_tracing();

    match cli.command {
        Some(Commands::Serve(args)) => {
            if let Err(e) = serve::run(args).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Fetch {
            url,
            output,
            raw,
            ignore_robots,
            client,
        }) => {
            let mut request = FetchRequest::new(url.clone());
            request.force_raw = raw;
            request.ignore_robots = ignore_robots;
            run_fetch(&url, request, output, &client).await;
        }
        Some(Commands::Extract {
            url,
            doc_type,
            client,
        }) => {
            run_extract(ExtractionRequest::new(url, doc_type), &client).await;
        }
        Some(Commands::Schema) => {
            emit(&request_schemas());
        }
        None => {
            eprintln!("Usage: docfetch fetch <URL>");
            eprintln!("   or: docfetch extract <URL> --type pdf|docx");
            eprintln!("   or: docfetch serve");
            eprintln!("   or: docfetch --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr, filtered by RUST_LOG (default: info)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_pipeline(client: &ClientArgs) -> Pipeline {
    Pipeline::builder()
        .options(client.options())
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
}

async fn run_fetch(url: &str, request: FetchRequest, output: Render, client: &ClientArgs) {
    let pipeline = build_pipeline(client);

    match pipeline.fetch_url(&request).await {
        Ok(result) => match output {
            Render::Frontmatter => emit(&frontmatter_document(url, &result)),
            Render::Json => {
                let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
                    eprintln!("Error serializing response: {}", e);
                    std::process::exit(1);
                });
                emit(&json);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_extract(request: ExtractionRequest, client: &ClientArgs) {
    let pipeline = build_pipeline(client);

    match pipeline.extract_file_text(&request).await {
        Ok(doc) => emit(&doc.text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Format a fetch result as markdown with YAML frontmatter
fn frontmatter_document(url: &str, result: &FetchResult) -> String {
    let mut output = String::new();

    output.push_str("---\n");
    output.push_str(&format!("url: {}\n", url));
    output.push_str(&format!("status_code: {}\n", result.status_code));
    if !result.content_type.is_empty() {
        output.push_str(&format!("source_content_type: {}\n", result.content_type));
    }
    output.push_str("---\n");
    output.push_str(&result.text);

    output
}

/// JSON Schemas of every request body, keyed by endpoint
fn request_schemas() -> String {
    let schemas = serde_json::json!({
        "/fetch_url/": schemars::schema_for!(FetchRequest),
        "/extract_file_text/": schemars::schema_for!(ExtractionRequest),
        "/extract_pdf_text/": schemars::schema_for!(docfetch::server::PdfTextRequest),
        "/transcript": schemars::schema_for!(docfetch::server::TranscriptRequest),
    });
    serde_json::to_string_pretty(&schemas).unwrap_or_default()
}

/// Print a line to stdout
///
/// A closed pipe (`docfetch fetch ... | head`) ends the process quietly.
fn emit(text: &str) {
    let outcome = writeln!(io::stdout().lock(), "{}", text);
    match outcome {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        Err(e) => {
            eprintln!("Error writing to stdout: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfetch::ContentFormat;

    fn result(content_type: &str, text: &str) -> FetchResult {
        FetchResult {
            content_type: content_type.to_string(),
            text: text.to_string(),
            status_code: 200,
            format: ContentFormat::Markdown,
        }
    }

    #[test]
    fn test_frontmatter_document() {
        let output =
            frontmatter_document("https://example.com", &result("text/html", "# Hello World"));

        assert!(output.starts_with("---\n"));
        assert!(output.contains("url: https://example.com\n"));
        assert!(output.contains("status_code: 200\n"));
        assert!(output.contains("source_content_type: text/html\n"));
        assert!(output.ends_with("---\n# Hello World"));
    }

    #[test]
    fn test_frontmatter_skips_empty_content_type() {
        let output = frontmatter_document("https://example.com", &result("", "body"));
        assert!(!output.contains("source_content_type"));
    }

    #[test]
    fn test_request_schemas() {
        let schemas: serde_json::Value = serde_json::from_str(&request_schemas()).unwrap();
        assert!(schemas["/fetch_url/"]["properties"]["url"].is_object());
        assert!(schemas["/fetch_url/"]["properties"]["force_raw"].is_object());
        assert!(schemas["/extract_file_text/"]["properties"]["type"].is_object());
        assert!(schemas["/transcript"]["properties"]["url"].is_object());
    }

    #[test]
    fn test_client_args_options() {
        let args = ClientArgs {
            user_agent: "Bot/2.0".to_string(),
            timeout_secs: 3,
            max_body_bytes: 1024,
            robots_fail_closed: true,
        };
        let options = args.options();
        assert_eq!(options.user_agent, "Bot/2.0");
        assert_eq!(options.timeout, Duration::from_secs(3));
        assert_eq!(options.max_body_bytes, 1024);
        assert!(!options.robots_fail_open);
    }

    #[test]
    fn test_cli_parses_fetch() {
        let cli = Cli::try_parse_from(["docfetch", "fetch", "https://example.com", "--raw"]).unwrap();
        match cli.command {
            Some(Commands::Fetch { url, raw, ignore_robots, .. }) => {
                assert_eq!(url, "https://example.com");
                assert!(raw);
                assert!(!ignore_robots);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_json_output() {
        let cli =
            Cli::try_parse_from(["docfetch", "fetch", "https://example.com", "-o", "json"]).unwrap();
        match cli.command {
            Some(Commands::Fetch { output, .. }) => assert_eq!(output, Render::Json),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parses_extract() {
        let cli = Cli::try_parse_from([
            "docfetch",
            "extract",
            "https://example.com/a.pdf",
            "--type",
            "pdf",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Extract { url, doc_type, .. }) => {
                assert_eq!(url, "https://example.com/a.pdf");
                assert_eq!(doc_type, "pdf");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
