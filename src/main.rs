use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use url::Url;

use lightkeeper::{
    assert_score, AuditRunner, Category, HarnessConfig, LighthouseCli, Session, Tenants,
    ThresholdSet,
};

#[derive(Parser)]
#[command(
    name = "lightkeeper",
    about = "Audit a live page with Lighthouse and assert category score thresholds",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a browser session, navigate, audit, and assert every category
    /// against the active threshold set.
    Audit {
        /// Absolute URL to audit. Overrides --tenant/--path.
        #[arg(long)]
        url: Option<String>,
        /// Tenant identifier resolved to a subdomain via the tenants fixture.
        #[arg(long, conflicts_with = "url")]
        tenant: Option<String>,
        /// Path on the tenant site, e.g. /courses/my-course.
        #[arg(long, default_value = "/")]
        path: String,
        /// Journey name; reports land under results/<journey>/.
        #[arg(long, default_value = "adhoc")]
        journey: String,
        /// Bind the browser to an explicit remote-debugging port.
        #[arg(long)]
        port: Option<u16>,
        /// Tenant fixture file.
        #[arg(long, default_value = lightkeeper::tenants::DEFAULT_FIXTURE)]
        tenants: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = HarnessConfig::from_env();

    match cli.command {
        Commands::Audit {
            url,
            tenant,
            path,
            journey,
            port,
            tenants,
        } => {
            let target = resolve_target(&config, url, tenant, &path, &tenants)?;
            run_audit(&config, target, &journey, port).await
        }
    }
}

fn resolve_target(
    config: &HarnessConfig,
    url: Option<String>,
    tenant: Option<String>,
    path: &str,
    tenants_fixture: &str,
) -> Result<Url> {
    let raw = match (url, tenant) {
        (Some(url), _) => url,
        (None, Some(tenant)) => {
            let tenants = Tenants::load(tenants_fixture)?;
            let subdomain = tenants
                .subdomain(&tenant)
                .with_context(|| format!("tenant `{tenant}` not found in {tenants_fixture}"))?;
            config.endpoint.page_url(subdomain, path)
        }
        (None, None) => bail!("either --url or --tenant is required"),
    };
    Url::parse(&raw).with_context(|| format!("`{raw}` is not a valid url"))
}

async fn run_audit(
    config: &HarnessConfig,
    target: Url,
    journey: &str,
    port: Option<u16>,
) -> Result<()> {
    let session = Session::launch(config, port).await?;
    let outcome = audit_and_assert(config, &session, target, journey).await;
    session.close().await?;

    let failed = outcome?;
    if failed > 0 {
        bail!("{failed} of {} categories fell below their thresholds", Category::ALL.len());
    }
    Ok(())
}

async fn audit_and_assert(
    config: &HarnessConfig,
    session: &Session,
    target: Url,
    journey: &str,
) -> Result<usize> {
    session.navigate(target.as_str()).await?;

    let engine = Arc::new(LighthouseCli::new()?);
    let runner = AuditRunner::new(engine, &config.results_root);
    let lhr = runner.run(session, journey, Some(target), None).await?;

    let thresholds = ThresholdSet::for_mode(config.thresholds);
    let mut failed = 0;
    // A failing category never aborts the remaining assertions.
    for category in Category::ALL {
        let outcome = assert_score(&lhr, category, thresholds.minimum(category));
        if outcome.pass {
            info!(category = %category, "threshold met\n{}", outcome.message());
        } else {
            failed += 1;
            error!(category = %category, "threshold missed\n{}", outcome.message());
        }
    }
    Ok(failed)
}
