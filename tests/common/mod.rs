use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Secret the spawned server signs and verifies tokens with
pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub upload_dir: std::path::PathBuf,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let upload_dir = std::env::temp_dir().join(format!("portfolio-it-{}", uuid::Uuid::new_v4()));

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/portfolio-api");
        cmd.env("PORTFOLIO_PORT", port.to_string())
            .env("JWT_SECRET", JWT_SECRET)
            .env("UPLOAD_DIR", &upload_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited; without Postgres the server still starts and reports degraded health
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, upload_dir, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// A bearer token the spawned server accepts
#[allow(dead_code)]
pub fn editor_token() -> Result<String> {
    let claims = portfolio_api::auth::Claims::new(1, "editor@example.com".into(), "editor".into(), 1);
    Ok(portfolio_api::auth::generate_jwt(&claims, JWT_SECRET)?)
}

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// A pool on DATABASE_URL with the reference schema applied, or None when no
/// database is configured and the calling test should be skipped.
#[allow(dead_code)]
pub async fn database() -> Result<Option<sqlx::PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(8)
        .connect(&url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    // Test binaries run in parallel; serialize the DDL
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(424242)").execute(&mut *tx).await?;
    sqlx::Executor::execute(&mut *tx, SCHEMA).await.context("failed to apply sql/schema.sql")?;
    tx.commit().await?;

    Ok(Some(pool))
}

/// A name no other test run has used
#[allow(dead_code)]
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
