//! HAL 仿真传输端点
//!
//! 连接 Romi 时，HAL 仿真 WebSocket 客户端通过 `HALSIMWS_HOST` / `HALSIMWS_PORT`
//! 两个环境变量定位机器人。本模块只负责解析端点：
//!
//! - 环境变量存在时优先使用
//! - 否则回退到配置值（默认为 Romi 出厂 AP 地址 `10.0.0.2:3300`）
//! - **从不**修改进程环境

use std::fmt;

use crate::HalError;

/// 主机地址环境变量
pub const HOST_ENV: &str = "HALSIMWS_HOST";

/// 端口环境变量
pub const PORT_ENV: &str = "HALSIMWS_PORT";

/// Romi 出厂 AP 模式地址
pub const DEFAULT_HOST: &str = "10.0.0.2";

pub const DEFAULT_PORT: u16 = 3300;

/// 仿真传输端点
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimEndpoint {
    pub host: String,
    pub port: u16,
}

impl Default for SimEndpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl SimEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// 从进程环境解析，缺失的字段使用 `fallback`
    pub fn from_env_or(fallback: &SimEndpoint) -> Result<Self, HalError> {
        Self::from_lookup(fallback, |key| std::env::var(key).ok())
    }

    /// 使用自定义查找函数解析（便于测试）
    pub fn from_lookup<F>(fallback: &SimEndpoint, lookup: F) -> Result<Self, HalError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup(HOST_ENV) {
            Some(host) if !host.trim().is_empty() => host.trim().to_string(),
            Some(_) => {
                return Err(HalError::InvalidEndpoint(format!("{HOST_ENV} is empty")));
            },
            None => fallback.host.clone(),
        };

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                HalError::InvalidEndpoint(format!("{PORT_ENV}={raw:?}: {e}"))
            })?,
            None => fallback.port,
        };

        if port == 0 {
            return Err(HalError::InvalidEndpoint("port must be non-zero".to_string()));
        }

        Ok(Self { host, port })
    }
}

impl fmt::Display for SimEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_fallback_when_unset() {
        let endpoint = SimEndpoint::from_lookup(&SimEndpoint::default(), lookup_from(&[])).unwrap();
        assert_eq!(endpoint, SimEndpoint::new("10.0.0.2", 3300));
        assert_eq!(endpoint.to_string(), "10.0.0.2:3300");
    }

    #[test]
    fn test_env_overrides_fallback() {
        let endpoint = SimEndpoint::from_lookup(
            &SimEndpoint::default(),
            lookup_from(&[(HOST_ENV, "192.168.1.50"), (PORT_ENV, "3301")]),
        )
        .unwrap();
        assert_eq!(endpoint, SimEndpoint::new("192.168.1.50", 3301));
    }

    #[test]
    fn test_partial_override() {
        let fallback = SimEndpoint::new("localhost", 4000);
        let endpoint =
            SimEndpoint::from_lookup(&fallback, lookup_from(&[(PORT_ENV, "5000")])).unwrap();
        assert_eq!(endpoint, SimEndpoint::new("localhost", 5000));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = SimEndpoint::from_lookup(
            &SimEndpoint::default(),
            lookup_from(&[(PORT_ENV, "not-a-port")]),
        )
        .unwrap_err();
        assert!(matches!(err, HalError::InvalidEndpoint(_)));

        let err =
            SimEndpoint::from_lookup(&SimEndpoint::default(), lookup_from(&[(PORT_ENV, "0")]))
                .unwrap_err();
        assert!(matches!(err, HalError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_empty_host_rejected() {
        let err =
            SimEndpoint::from_lookup(&SimEndpoint::default(), lookup_from(&[(HOST_ENV, "  ")]))
                .unwrap_err();
        assert!(matches!(err, HalError::InvalidEndpoint(_)));
    }

    #[test]
    #[serial]
    fn test_from_process_env_does_not_mutate() {
        let host_before = std::env::var(HOST_ENV).ok();
        let port_before = std::env::var(PORT_ENV).ok();

        let _ = SimEndpoint::from_env_or(&SimEndpoint::default());

        assert_eq!(std::env::var(HOST_ENV).ok(), host_before);
        assert_eq!(std::env::var(PORT_ENV).ok(), port_before);
    }
}
