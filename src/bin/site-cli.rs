use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use tenant_site::config::ResolverConfig;
use tenant_site::routing::HostResolver;

#[derive(Parser)]
#[command(name = "site-cli")]
#[command(about = "Management CLI for the tenant site service", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:8081", env = "SITE_ADMIN_URL")]
    url: String,

    /// Admin API bearer token.
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION", env = "SITE_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a hostname locally, without contacting the service
    Resolve {
        host: String,
        /// Base domain to resolve against (repeatable)
        #[arg(short, long = "base-domain")]
        base_domains: Vec<String>,
    },
    /// Check service status
    Status,
    /// List business applications
    Tenants {
        /// Filter by status: pending, approved or rejected
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Approve an application
    Approve { slug: String },
    /// Reject an application
    Reject { slug: String },
    /// Inspect the effective-config cache
    Cache,
    /// Drop every cached effective config
    PurgeCache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (method, path) = match cli.command {
        Commands::Resolve { host, base_domains } => {
            let resolver = if base_domains.is_empty() {
                HostResolver::from_config(&ResolverConfig::default())
            } else {
                HostResolver::new(&base_domains)
            };
            let kind = resolver.resolve(&host);
            println!("{}", serde_json::to_string_pretty(&kind)?);
            return Ok(());
        }
        Commands::Status => (Method::GET, "/admin/status".to_string()),
        Commands::Tenants { status } => match status {
            Some(s) => (Method::GET, format!("/admin/tenants?status={s}")),
            None => (Method::GET, "/admin/tenants".to_string()),
        },
        Commands::Approve { slug } => (Method::POST, format!("/admin/tenants/{slug}/approve")),
        Commands::Reject { slug } => (Method::POST, format!("/admin/tenants/{slug}/reject")),
        Commands::Cache => (Method::GET, "/admin/cache".to_string()),
        Commands::PurgeCache => (Method::DELETE, "/admin/cache".to_string()),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = reqwest::Client::new()
        .request(method, format!("{}{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
