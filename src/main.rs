use anyhow::Result;
use clap::Parser;
use pypi_show_urls::http::ClientConfig;
use pypi_show_urls::index::accounts::{self, XmlRpcLookup};
use pypi_show_urls::index::IndexUrls;
use pypi_show_urls::name::PackageName;
use pypi_show_urls::report::{ConsoleReporter, Reporter};
use pypi_show_urls::spider::Spider;
use std::time::Duration;
use url::Url;

/// pypi-show-urls - Package hosting inspector
///
/// Show where the installable files of a package come from and which
/// versions are only available outside the index.
///
/// Examples:
///   pypi-show-urls -p requests          # Inspect one package
///   pypi-show-urls -u dstufft           # Inspect every package of a user
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Packages to inspect
    #[arg(
        short = 'p',
        long = "packages",
        value_name = "PACKAGE",
        num_args = 1..,
        required_unless_present = "users",
        conflicts_with = "users"
    )]
    packages: Vec<String>,

    /// Users whose packages to inspect
    #[arg(short = 'u', long = "users", value_name = "USER", num_args = 1..)]
    users: Vec<String>,

    /// Print every candidate URL instead of per-page counts
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Simple listing root of the index (also via PYPI_INDEX_URL)
    #[arg(
        long = "index-url",
        value_name = "URL",
        env = "PYPI_INDEX_URL",
        default_value = IndexUrls::DEFAULT_ROOT
    )]
    index_url: Url,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS", default_value_t = 30)]
    timeout: u64,

    /// Skip TLS certificate verification
    #[arg(long = "insecure")]
    insecure: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let client = ClientConfig {
        timeout: Duration::from_secs(cli.timeout),
        verify_tls: !cli.insecure,
        ..ClientConfig::default()
    }
    .build()?;
    let index = IndexUrls::new(cli.index_url)?;

    let packages = if cli.users.is_empty() {
        cli.packages
    } else {
        let lookup = XmlRpcLookup::new(client.clone(), index.xmlrpc_url()?);
        accounts::expand_users(&lookup, &cli.users).await?
    };

    let spider = Spider::new(&client, &index);
    let mut reporter = ConsoleReporter::new(cli.verbose);

    for name in packages {
        let package = PackageName::new(&name);
        reporter.package_started(&package);
        match spider.process_package(&package, &mut reporter).await? {
            Some(report) => reporter.package_finished(&package, &report.external_only()),
            None => reporter.package_not_found(&package),
        }
    }

    Ok(())
}
