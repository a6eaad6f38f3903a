//! Configuração do roomcast carregada a partir de `roomcast.toml`.
//!
//! A struct [`RoomcastConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! As variáveis de ambiente `ROOMCAST_TOKEN` e `ROOMCAST_ROOM_ID` têm
//! precedência sobre o arquivo.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::driver::NotifyOn;
use crate::error::RoomcastError;
use crate::notify::types::{DEFAULT_ENDPOINT, DEFAULT_MESSAGE_TEMPLATE, default_send_log_on};
use crate::notify::{HttpTransport, NotificationConfig, NotifyError, Status};
use crate::state_machine::RetryConfig;

pub const DEFAULT_CONFIG_PATH: &str = "roomcast.toml";

/// Configuração de nível superior carregada de `roomcast.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoomcastConfig {
    /// Token do usuário ou bot (enviado como `Bearer`).
    #[serde(default)]
    pub token: String,

    /// Sala de destino das mensagens.
    #[serde(default)]
    pub room_id: String,

    /// URL do endpoint de mensagens.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Status para os quais o log é anexado.
    #[serde(default = "default_send_log_on_list")]
    pub send_log_on: Vec<Status>,

    #[serde(default = "default_true")]
    pub on_success: bool,

    #[serde(default = "default_true")]
    pub on_warning: bool,

    #[serde(default = "default_true")]
    pub on_failure: bool,

    /// Máximo de retentativas após a primeira tentativa.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Espera entre tentativas, em segundos.
    #[serde(default = "default_retry_waitsec")]
    pub retry_waitsec: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Template do título da mensagem.
    #[serde(default = "default_message_template")]
    pub message_template: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

// Warning e failure levam o log anexado.
fn default_send_log_on_list() -> Vec<Status> {
    default_send_log_on().into_iter().collect()
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    10
}

fn default_retry_waitsec() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_message_template() -> String {
    DEFAULT_MESSAGE_TEMPLATE.to_string()
}

impl Default for RoomcastConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            room_id: String::new(),
            endpoint: default_endpoint(),
            send_log_on: default_send_log_on_list(),
            on_success: default_true(),
            on_warning: default_true(),
            on_failure: default_true(),
            max_retries: default_max_retries(),
            retry_waitsec: default_retry_waitsec(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            message_template: default_message_template(),
        }
    }
}

impl RoomcastConfig {
    /// Carrega a configuração do caminho dado (ou `roomcast.toml` no diretório atual).
    /// Usa valores padrão se o arquivo padrão não existir; um caminho explícito
    /// inexistente é erro.
    pub fn load(path: Option<&Path>) -> Result<Self, RoomcastError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };

        config.apply_env(
            std::env::var("ROOMCAST_TOKEN").ok(),
            std::env::var("ROOMCAST_ROOM_ID").ok(),
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, RoomcastError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<RoomcastConfig>(&contents)?)
    }

    /// Valores do ambiente têm precedência sobre o arquivo, se não vazios.
    pub fn apply_env(&mut self, token: Option<String>, room_id: Option<String>) {
        if let Some(token) = token
            && !token.is_empty()
        {
            self.token = token;
        }
        if let Some(room_id) = room_id
            && !room_id.is_empty()
        {
            self.room_id = room_id;
        }
    }

    /// Valida e produz a configuração imutável usada em cada entrega.
    pub fn notification_config(&self) -> Result<NotificationConfig, NotifyError> {
        Ok(NotificationConfig::new(
            &self.endpoint,
            self.token.as_str(),
            self.room_id.as_str(),
            self.send_log_on.iter().copied(),
        )?
        .with_message_template(self.message_template.as_str()))
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            retry_waitsec: self.retry_waitsec,
        }
    }

    pub fn notify_on(&self) -> NotifyOn {
        NotifyOn {
            on_success: self.on_success,
            on_warning: self.on_warning,
            on_failure: self.on_failure,
        }
    }

    pub fn transport(&self) -> Result<HttpTransport, NotifyError> {
        HttpTransport::with_timeouts(
            Duration::from_secs(self.connect_timeout_secs),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_values() {
        let config = RoomcastConfig::default();
        assert!(config.token.is_empty());
        assert!(config.room_id.is_empty());
        assert_eq!(config.endpoint, "https://api.ciscospark.com/v1/messages");
        assert_eq!(config.send_log_on, vec![Status::Warning, Status::Failure]);
        assert!(config.on_success && config.on_warning && config.on_failure);
        assert_eq!(config.max_retries, 10);
        assert_eq!(config.retry_waitsec, 30);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            token = "my_token"
            room_id = "my_roomId"
            send_log_on = ["failure"]
            on_success = false
            max_retries = 5
            retry_waitsec = 10
        "#;
        let config: RoomcastConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.token, "my_token");
        assert_eq!(config.room_id, "my_roomId");
        assert_eq!(config.send_log_on, vec![Status::Failure]);
        assert!(!config.on_success);
        assert!(config.on_warning);
        assert_eq!(config.retry_config().max_retries, 5);
        assert_eq!(config.retry_config().retry_waitsec, 10);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn send_log_on_ignores_case() {
        let config: RoomcastConfig =
            toml::from_str(r#"send_log_on = ["Warning", "FAILURE"]"#).unwrap();
        assert_eq!(config.send_log_on, vec![Status::Warning, Status::Failure]);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = toml::from_str::<RoomcastConfig>(r#"send_log_on = ["fatal"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = RoomcastConfig {
            token: "from-file".into(),
            room_id: "room-file".into(),
            ..Default::default()
        };
        config.apply_env(Some("from-env".into()), Some(String::new()));
        assert_eq!(config.token, "from-env");
        assert_eq!(config.room_id, "room-file");
    }

    #[test]
    fn missing_credentials_fail_validation() {
        let err = RoomcastConfig::default().notification_config().unwrap_err();
        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[test]
    fn validated_config_keeps_template_and_policy() {
        let config = RoomcastConfig {
            token: "t".into(),
            room_id: "r".into(),
            send_log_on: vec![Status::Success],
            message_template: "{label}: {status}".into(),
            ..Default::default()
        };
        let validated = config.notification_config().unwrap();
        assert_eq!(validated.message_template(), "{label}: {status}");
        assert!(validated.send_log_on().contains(&Status::Success));
        assert_eq!(validated.send_log_on().len(), 1);
    }

    #[test]
    fn load_reads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token = \"file-token\"\nroom_id = \"file-room\"").unwrap();

        let config = RoomcastConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.max_retries, 10);
        assert!(!config.room_id.is_empty());
    }

    #[test]
    fn load_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = RoomcastConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(RoomcastError::Io(_))));
    }
}
