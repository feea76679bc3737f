//! Configuration entity models

use crate::error::ValidationError;
use crate::record::{positional_id, validate_name, validate_port, EngineObject};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing closed vocabularies from strings
#[derive(Debug, Clone)]
pub enum ParseError {
    InvalidMode(String),
    InvalidBalance(String),
    InvalidCondition(String),
    InvalidRuleAction(String),
    InvalidTransactionStatus(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidMode(s) => write!(f, "Invalid mode: {}", s),
            ParseError::InvalidBalance(s) => write!(f, "Invalid balance algorithm: {}", s),
            ParseError::InvalidCondition(s) => write!(f, "Invalid condition: {}", s),
            ParseError::InvalidRuleAction(s) => write!(f, "Invalid rule action: {}", s),
            ParseError::InvalidTransactionStatus(s) => {
                write!(f, "Invalid transaction status: {}", s)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Proxying mode of a site, frontend or backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Http,
    Tcp,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Http => "http",
            Mode::Tcp => "tcp",
        }
    }
}

impl FromStr for Mode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Mode::Http),
            "tcp" => Ok(Mode::Tcp),
            _ => Err(ParseError::InvalidMode(s.to_string())),
        }
    }
}

/// Load-balancing algorithm of a backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    RoundRobin,
    LeastConn,
    Source,
}

impl Balance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Balance::RoundRobin => "roundrobin",
            Balance::LeastConn => "leastconn",
            Balance::Source => "source",
        }
    }
}

impl FromStr for Balance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roundrobin" => Ok(Balance::RoundRobin),
            "leastconn" => Ok(Balance::LeastConn),
            "source" => Ok(Balance::Source),
            _ => Err(ParseError::InvalidBalance(s.to_string())),
        }
    }
}

/// ACL condition polarity on a rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    If,
    Unless,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::If => "if",
            Condition::Unless => "unless",
        }
    }
}

impl FromStr for Condition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "if" => Ok(Condition::If),
            "unless" => Ok(Condition::Unless),
            _ => Err(ParseError::InvalidCondition(s.to_string())),
        }
    }
}

/// Action taken by a tcp content rule
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Accept,
    Reject,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Accept => "accept",
            RuleAction::Reject => "reject",
        }
    }
}

impl FromStr for RuleAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(RuleAction::Accept),
            "reject" => Ok(RuleAction::Reject),
            _ => Err(ParseError::InvalidRuleAction(s.to_string())),
        }
    }
}

/// Both sides of a conditional must be present together.
fn validate_condition(
    cond: Option<Condition>,
    cond_test: &Option<String>,
) -> Result<(), ValidationError> {
    match (cond, cond_test) {
        (Some(_), None) => Err(ValidationError::Missing("cond_test")),
        (None, Some(_)) => Err(ValidationError::Missing("cond")),
        _ => Ok(()),
    }
}

/// Site model: a named service bundle in the engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Site {
    pub name: String,
    pub mode: Option<Mode>,
}

impl EngineObject for Site {
    fn apply_header_token(&mut self, token: &str) {
        self.name = token.to_string();
    }

    fn set_field(&mut self, key: &str, value: &str) {
        if key == "mode"
            && let Ok(mode) = value.parse()
        {
            self.mode = Some(mode);
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(mode) = self.mode {
            fields.push(("mode", mode.as_str().to_string()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)
    }
}

/// Frontend model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Frontend {
    pub name: String,
    pub mode: Option<Mode>,
    /// Backend traffic is forwarded to when no switching rule matches.
    pub default_backend: Option<String>,
    pub max_connections: Option<i64>,
    /// Client inactivity timeout in milliseconds.
    pub client_timeout: Option<i64>,
}

impl EngineObject for Frontend {
    fn apply_header_token(&mut self, token: &str) {
        self.name = token.to_string();
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "mode" => {
                if let Ok(mode) = value.parse() {
                    self.mode = Some(mode);
                }
            }
            "defaultfarm" => self.default_backend = Some(value.to_string()),
            "maxconn" => {
                if let Ok(v) = value.parse() {
                    self.max_connections = Some(v);
                }
            }
            "clitimeout" => {
                if let Ok(v) = value.parse() {
                    self.client_timeout = Some(v);
                }
            }
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(mode) = self.mode {
            fields.push(("mode", mode.as_str().to_string()));
        }
        if let Some(backend) = &self.default_backend {
            fields.push(("defaultfarm", backend.clone()));
        }
        if let Some(v) = self.max_connections {
            fields.push(("maxconn", v.to_string()));
        }
        if let Some(v) = self.client_timeout {
            fields.push(("clitimeout", v.to_string()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        if let Some(backend) = &self.default_backend {
            validate_name("default_backend", backend)?;
        }
        if let Some(v) = self.max_connections
            && v <= 0
        {
            return Err(ValidationError::invalid("max_connections", "must be positive"));
        }
        if let Some(v) = self.client_timeout
            && v < 0
        {
            return Err(ValidationError::invalid("client_timeout", "must not be negative"));
        }
        Ok(())
    }
}

/// Backend model
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Backend {
    pub name: String,
    pub mode: Option<Mode>,
    pub balance: Option<Balance>,
    /// Server connect timeout in milliseconds.
    pub connect_timeout: Option<i64>,
    /// Server inactivity timeout in milliseconds.
    pub server_timeout: Option<i64>,
}

impl EngineObject for Backend {
    fn apply_header_token(&mut self, token: &str) {
        self.name = token.to_string();
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "mode" => {
                if let Ok(mode) = value.parse() {
                    self.mode = Some(mode);
                }
            }
            "balance" => {
                if let Ok(balance) = value.parse() {
                    self.balance = Some(balance);
                }
            }
            "contimeout" => {
                if let Ok(v) = value.parse() {
                    self.connect_timeout = Some(v);
                }
            }
            "srvtimeout" => {
                if let Ok(v) = value.parse() {
                    self.server_timeout = Some(v);
                }
            }
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(mode) = self.mode {
            fields.push(("mode", mode.as_str().to_string()));
        }
        if let Some(balance) = self.balance {
            fields.push(("balance", balance.as_str().to_string()));
        }
        if let Some(v) = self.connect_timeout {
            fields.push(("contimeout", v.to_string()));
        }
        if let Some(v) = self.server_timeout {
            fields.push(("srvtimeout", v.to_string()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        if let Some(v) = self.connect_timeout
            && v < 0
        {
            return Err(ValidationError::invalid("connect_timeout", "must not be negative"));
        }
        if let Some(v) = self.server_timeout
            && v < 0
        {
            return Err(ValidationError::invalid("server_timeout", "must not be negative"));
        }
        Ok(())
    }
}

/// Server model: one balanced server inside a backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Server {
    pub name: String,
    pub address: String,
    pub port: Option<i64>,
    pub weight: Option<i64>,
    /// Only receives traffic when every non-backup server is down.
    pub backup: bool,
}

impl EngineObject for Server {
    fn apply_header_token(&mut self, token: &str) {
        self.name = token.to_string();
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "ip" => self.address = value.to_string(),
            "port" => {
                if let Ok(v) = value.parse() {
                    self.port = Some(v);
                }
            }
            "weight" => {
                if let Ok(v) = value.parse() {
                    self.weight = Some(v);
                }
            }
            "backup" => self.backup = value.is_empty() || value == "enabled",
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("ip", self.address.clone())];
        if let Some(v) = self.port {
            fields.push(("port", v.to_string()));
        }
        if let Some(v) = self.weight {
            fields.push(("weight", v.to_string()));
        }
        if self.backup {
            fields.push(("backup", "enabled".to_string()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        if self.address.is_empty() {
            return Err(ValidationError::Missing("address"));
        }
        if let Some(port) = self.port {
            validate_port("port", port)?;
        }
        if let Some(weight) = self.weight
            && !(0..=256).contains(&weight)
        {
            return Err(ValidationError::invalid(
                "weight",
                format!("{} is outside 0-256", weight),
            ));
        }
        Ok(())
    }
}

/// Listener model: a bind point inside a frontend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Listener {
    pub name: String,
    pub address: String,
    pub port: Option<i64>,
    pub ssl: bool,
    pub ssl_certificate: Option<String>,
}

impl EngineObject for Listener {
    fn apply_header_token(&mut self, token: &str) {
        self.name = token.to_string();
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "ip" => self.address = value.to_string(),
            "port" => {
                if let Ok(v) = value.parse() {
                    self.port = Some(v);
                }
            }
            "ssl" => self.ssl = value.is_empty() || value == "enabled",
            "sslcert" => self.ssl_certificate = Some(value.to_string()),
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("ip", self.address.clone())];
        if let Some(v) = self.port {
            fields.push(("port", v.to_string()));
        }
        if self.ssl {
            fields.push(("ssl", "enabled".to_string()));
        }
        if let Some(cert) = &self.ssl_certificate {
            fields.push(("sslcert", cert.clone()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("name", &self.name)?;
        if self.address.is_empty() {
            return Err(ValidationError::Missing("address"));
        }
        if let Some(port) = self.port {
            validate_port("port", port)?;
        }
        if self.ssl && self.ssl_certificate.is_none() {
            return Err(ValidationError::Missing("ssl_certificate"));
        }
        Ok(())
    }
}

/// Backend switching rule: routes frontend traffic to a backend by ACL.
/// Ids are positional within one engine dump and not durable across dumps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendSwitchingRule {
    pub id: i64,
    pub target_backend: String,
    pub cond: Option<Condition>,
    pub cond_test: Option<String>,
}

impl EngineObject for BackendSwitchingRule {
    fn apply_header_token(&mut self, token: &str) {
        self.id = positional_id(token);
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "farm" => self.target_backend = value.to_string(),
            "cond" => {
                if let Ok(cond) = value.parse() {
                    self.cond = Some(cond);
                }
            }
            "condtest" => self.cond_test = Some(value.to_string()),
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("farm", self.target_backend.clone())];
        if let Some(cond) = self.cond {
            fields.push(("cond", cond.as_str().to_string()));
        }
        if let Some(test) = &self.cond_test {
            fields.push(("condtest", test.clone()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_name("target_backend", &self.target_backend)?;
        validate_condition(self.cond, &self.cond_test)
    }
}

/// Tcp content rule: accepts or rejects connections by inspected content.
/// Ids are positional within one engine dump and not durable across dumps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TcpContentRule {
    pub id: i64,
    pub action: Option<RuleAction>,
    pub cond: Option<Condition>,
    pub cond_test: Option<String>,
}

impl EngineObject for TcpContentRule {
    fn apply_header_token(&mut self, token: &str) {
        self.id = positional_id(token);
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "action" => {
                if let Ok(action) = value.parse() {
                    self.action = Some(action);
                }
            }
            "cond" => {
                if let Ok(cond) = value.parse() {
                    self.cond = Some(cond);
                }
            }
            "condtest" => self.cond_test = Some(value.to_string()),
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(action) = self.action {
            fields.push(("action", action.as_str().to_string()));
        }
        if let Some(cond) = self.cond {
            fields.push(("cond", cond.as_str().to_string()));
        }
        if let Some(test) = &self.cond_test {
            fields.push(("condtest", test.clone()));
        }
        fields
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.action.is_none() {
            return Err(ValidationError::Missing("action"));
        }
        validate_condition(self.cond, &self.cond_test)
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    InProgress,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::InProgress => "in_progress",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(TransactionStatus::InProgress),
            "failed" => Ok(TransactionStatus::Failed),
            _ => Err(ParseError::InvalidTransactionStatus(s.to_string())),
        }
    }
}

/// Transaction model: a named, isolated set of pending configuration edits
/// opened against a baseline version
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Transaction {
    pub id: String,
    pub status: TransactionStatus,
    /// Baseline configuration version the transaction was opened against.
    pub version: i64,
}

impl EngineObject for Transaction {
    fn apply_header_token(&mut self, token: &str) {
        self.id = token.to_string();
    }

    fn set_field(&mut self, key: &str, value: &str) {
        match key {
            "status" => {
                if let Ok(status) = value.parse() {
                    self.status = status;
                }
            }
            "version" => {
                if let Ok(v) = value.parse() {
                    self.version = v;
                }
            }
            _ => {}
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("status", self.status.as_str().to_string()),
            ("version", self.version.to_string()),
        ]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::Missing("id"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip() {
        assert_eq!(Mode::from_str("http").unwrap(), Mode::Http);
        assert_eq!(Mode::Tcp.as_str(), "tcp");
        assert!(Mode::from_str("quic").is_err());
    }

    #[test]
    fn test_server_fields_and_inflation() {
        let mut server = Server::default();
        server.apply_header_token("app01");
        server.set_field("ip", "10.0.0.4");
        server.set_field("port", "8080");
        server.set_field("weight", "not-a-number");
        server.set_field("backup", "");
        server.set_field("bogus", "ignored");

        assert_eq!(server.name, "app01");
        assert_eq!(server.address, "10.0.0.4");
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.weight, None);
        assert!(server.backup);

        let fields = server.fields();
        assert!(fields.contains(&("ip", "10.0.0.4".to_string())));
        assert!(fields.contains(&("backup", "enabled".to_string())));
    }

    #[test]
    fn test_server_validation() {
        let server = Server {
            name: "app01".to_string(),
            address: "10.0.0.4".to_string(),
            port: Some(8080),
            weight: Some(100),
            backup: false,
        };
        assert!(server.validate().is_ok());

        let no_address = Server {
            name: "app01".to_string(),
            ..Default::default()
        };
        assert_eq!(
            no_address.validate(),
            Err(ValidationError::Missing("address"))
        );

        let bad_weight = Server {
            weight: Some(1000),
            ..server
        };
        assert!(bad_weight.validate().is_err());
    }

    #[test]
    fn test_listener_ssl_requires_certificate() {
        let listener = Listener {
            name: "bind1".to_string(),
            address: "0.0.0.0".to_string(),
            port: Some(443),
            ssl: true,
            ssl_certificate: None,
        };
        assert_eq!(
            listener.validate(),
            Err(ValidationError::Missing("ssl_certificate"))
        );
    }

    #[test]
    fn test_rule_condition_pairing() {
        let mut rule = BackendSwitchingRule {
            id: 1,
            target_backend: "api".to_string(),
            cond: Some(Condition::If),
            cond_test: None,
        };
        assert_eq!(rule.validate(), Err(ValidationError::Missing("cond_test")));

        rule.cond_test = Some("{ path_beg /api }".to_string());
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_tcp_content_rule_requires_action() {
        let rule = TcpContentRule::default();
        assert_eq!(rule.validate(), Err(ValidationError::Missing("action")));
    }

    #[test]
    fn test_rule_header_token_leniency() {
        let mut rule = TcpContentRule::default();
        rule.apply_header_token("garbage");
        assert_eq!(rule.id, 0);
        rule.apply_header_token("12");
        assert_eq!(rule.id, 12);
    }

    #[test]
    fn test_entity_json_round_trip() {
        let frontend = Frontend {
            name: "web".to_string(),
            mode: Some(Mode::Http),
            default_backend: Some("app".to_string()),
            max_connections: Some(5000),
            client_timeout: None,
        };
        let json = serde_json::to_string(&frontend).unwrap();
        let back: Frontend = serde_json::from_str(&json).unwrap();
        assert_eq!(back, frontend);
    }
}
