//! 客户端 IP 解析
//!
//! 转发头（`X-Forwarded-For` / `X-Real-IP`）只在对端是代理时才可信：
//! - 配置了 `api.trusted_proxies`：对端命中其中一条规则（单个 IP 或 CIDR）
//! - 未配置：对端是私有地址或 loopback，视为同机 / 内网反向代理
//!
//! 其余情况一律使用 TCP 对端地址，防止伪造。

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::{debug, warn};

/// 解析 IP，兼容 `ip:port` 与 `[v6]:port`
pub fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    raw.parse::<SocketAddr>()
        .map(|addr| addr.ip())
        .or_else(|_| {
            raw.trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<IpAddr>()
        })
        .ok()
}

/// 私有网段、链路本地或 loopback
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip.to_canonical() {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            let head = v6.segments()[0];
            // fc00::/7 唯一本地地址，fe80::/10 链路本地
            v6.is_loopback() || (head & 0xfe00) == 0xfc00 || (head & 0xffc0) == 0xfe80
        }
    }
}

/// 一条可信代理规则
#[derive(Debug, Clone, PartialEq, Eq)]
enum ProxyRule {
    Exact(IpAddr),
    Network { base: IpAddr, prefix: u8 },
}

impl ProxyRule {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let Some((base, prefix)) = raw.split_once('/') else {
            return raw.parse().ok().map(ProxyRule::Exact);
        };

        let base: IpAddr = base.parse().ok()?;
        let prefix: u8 = prefix.parse().ok()?;
        let max = if base.is_ipv4() { 32 } else { 128 };
        (prefix <= max).then_some(ProxyRule::Network { base, prefix })
    }

    fn matches(&self, ip: &IpAddr) -> bool {
        let ip = ip.to_canonical();
        match *self {
            ProxyRule::Exact(addr) => addr.to_canonical() == ip,
            ProxyRule::Network { base, prefix } => match (ip, base) {
                (IpAddr::V4(ip), IpAddr::V4(base)) => {
                    same_prefix(u128::from(ip.to_bits()), u128::from(base.to_bits()), prefix, 32)
                }
                (IpAddr::V6(ip), IpAddr::V6(base)) => {
                    same_prefix(ip.to_bits(), base.to_bits(), prefix, 128)
                }
                _ => false,
            },
        }
    }
}

/// 比较 `width` 位地址的前 `prefix` 位
fn same_prefix(a: u128, b: u128, prefix: u8, width: u32) -> bool {
    let host_bits = width - u32::from(prefix);
    a.checked_shr(host_bits).unwrap_or(0) == b.checked_shr(host_bits).unwrap_or(0)
}

/// 已解析的可信代理列表
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies {
    rules: Vec<ProxyRule>,
}

impl TrustedProxies {
    /// 无法解析的条目会被忽略并记录警告
    pub fn from_config(entries: &[String]) -> Self {
        let rules = entries
            .iter()
            .filter_map(|entry| {
                let rule = ProxyRule::parse(entry);
                if rule.is_none() {
                    warn!("Ignoring invalid trusted proxy entry: {:?}", entry);
                }
                rule
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.rules.iter().any(|rule| rule.matches(ip))
    }

    /// 对端是否可以提供转发头
    fn vouches_for(&self, peer: &IpAddr) -> bool {
        if self.is_empty() {
            is_private_or_local(peer)
        } else {
            self.contains(peer)
        }
    }

    /// 根据对端地址和转发头确定客户端 IP
    ///
    /// `forwarded` 只在对端可信时才会被调用。
    pub fn resolve<F>(&self, peer: Option<&str>, forwarded: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        let peer_ip = parse_ip(peer?)?;

        if self.vouches_for(&peer_ip)
            && let Some(raw) = forwarded()
        {
            // 转发头里不是 IP 的内容一律丢弃，回退到对端地址
            match parse_ip(&raw) {
                Some(client) => {
                    debug!("Peer {} is a proxy, client is {}", peer_ip, client);
                    return Some(client.to_string());
                }
                None => debug!("Ignoring unparsable forwarded address {:?}", raw),
            }
        }

        Some(peer_ip.to_string())
    }
}

/// `X-Forwarded-For` 的第一跳，其次 `X-Real-IP`
pub fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(String::from)
}

/// 从请求中提取客户端 IP
pub fn extract_client_ip(req: &HttpRequest, proxies: &TrustedProxies) -> Option<String> {
    let conn = req.connection_info();
    proxies.resolve(conn.peer_addr(), || forwarded_client(req.headers()))
}
