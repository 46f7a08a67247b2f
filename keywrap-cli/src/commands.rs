use anyhow::{ensure, Context};
use keywrap::delivery::{
    CallerContext, ConfiguredKeyResolver, DeliveryOrchestrator, SecretBytes, StaticSecretIssuer,
};
use keywrap::wrap::import_public_key;
use keywrap::AppConfig;
use keywrap_types::{AdapterDescriptor, DeliveryReceipt, KeyReference};
use serde::Serialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::info;
use url::Url;

pub struct SealArgs {
    pub provider: String,
    pub target: Option<Url>,
    pub pem: Option<PathBuf>,
    pub secret: SecretSource,
}

/// Where `seal` reads the plaintext secret from.
pub enum SecretSource {
    Env(String),
    Stdin,
    Prompt,
}

/// Facts about a public key, safe to print.
#[derive(Debug, Serialize)]
pub struct KeyFacts {
    pub modulus_bits: usize,
    pub ciphertext_bytes: usize,
    pub max_plaintext_bytes: usize,
    pub fingerprint: String,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::load()?,
    };
    info!(providers = config.providers.len(), "Configuration loaded");
    Ok(config)
}

pub async fn seal(config: &AppConfig, args: SealArgs) -> anyhow::Result<DeliveryReceipt> {
    let key = match &args.pem {
        Some(path) => KeyReference::Embedded {
            pem: tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?,
        },
        None => KeyReference::Provider,
    };
    let descriptor = AdapterDescriptor {
        provider: args.provider,
        target_url: args.target,
        key,
    };

    let secret = read_secret(&args.secret)?;
    let orchestrator = DeliveryOrchestrator::new(
        ConfiguredKeyResolver::from_config(config),
        StaticSecretIssuer::new(secret),
        config,
    );

    let caller = CallerContext::new(std::env::var("USER").unwrap_or_else(|_| "operator".into()));
    let delivery = orchestrator.deliver(&descriptor, &caller).await?;
    Ok(delivery.into())
}

pub async fn inspect(config: &AppConfig, path: &Path) -> anyhow::Result<KeyFacts> {
    let pem = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let key = import_public_key(&pem, &config.policy)?;

    Ok(KeyFacts {
        modulus_bits: key.modulus_bits(),
        ciphertext_bytes: key.size(),
        max_plaintext_bytes: key.max_plaintext_len(),
        fingerprint: key.fingerprint(),
    })
}

fn read_secret(source: &SecretSource) -> anyhow::Result<SecretBytes> {
    let secret = match source {
        SecretSource::Env(var) => {
            std::env::var(var).with_context(|| format!("environment variable {var} is not set"))?
        }
        SecretSource::Stdin => return read_secret_line(std::io::stdin().lock()),
        SecretSource::Prompt => rpassword::prompt_password_stderr("Secret: ")?,
    };
    let secret = SecretBytes::from(secret);
    ensure!(!secret.is_empty(), "secret is empty");
    Ok(secret)
}

/// First line of `reader`, without its line ending.
fn read_secret_line<R: BufRead>(mut reader: R) -> anyhow::Result<SecretBytes> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read secret from stdin")?;
    let len = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(len);

    let secret = SecretBytes::from(line);
    ensure!(!secret.is_empty(), "secret is empty");
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RSA_2048: &str = include_str!("../../tests/fixtures/rsa2048_public.pem");
    const RSA_1024: &str = include_str!("../../tests/fixtures/rsa1024_public.pem");

    fn pem_file(pem: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(pem.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_inspect_reports_key_facts() {
        let file = pem_file(RSA_2048);
        let facts = inspect(&AppConfig::default(), file.path()).await.unwrap();
        assert_eq!(facts.modulus_bits, 2048);
        assert_eq!(facts.ciphertext_bytes, 256);
        assert_eq!(facts.max_plaintext_bytes, 190);
        assert_eq!(facts.fingerprint.len(), 64);
    }

    #[tokio::test]
    async fn test_inspect_applies_policy() {
        let file = pem_file(RSA_1024);
        assert!(inspect(&AppConfig::default(), file.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_seal_with_pem_file_and_env_secret() {
        let file = pem_file(RSA_2048);
        std::env::set_var("KEYWRAP_CLI_TEST_SECRET", "sk_live_abc123");

        let receipt = seal(
            &AppConfig::default(),
            SealArgs {
                provider: "openai".to_string(),
                target: Some(Url::parse("https://app.example.com/next").unwrap()),
                pem: Some(file.path().to_path_buf()),
                secret: SecretSource::Env("KEYWRAP_CLI_TEST_SECRET".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(receipt.provider, "openai");
        assert_eq!(receipt.ciphertext.len(), 512);
        assert!(receipt.redirect.is_some());
    }

    #[test]
    fn test_missing_secret_env() {
        let result = read_secret(&SecretSource::Env(
            "KEYWRAP_CLI_TEST_UNSET_VARIABLE".to_string(),
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_line_strips_line_ending() {
        let secret = read_secret_line("sk_live_abc123\r\nignored\n".as_bytes()).unwrap();
        assert_eq!(secret.expose(), b"sk_live_abc123");

        let secret = read_secret_line("sk_live_abc123".as_bytes()).unwrap();
        assert_eq!(secret.expose(), b"sk_live_abc123");
    }

    #[test]
    fn test_empty_secret_line() {
        assert!(read_secret_line("\n".as_bytes()).is_err());
        assert!(read_secret_line("".as_bytes()).is_err());
    }
}
