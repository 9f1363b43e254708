//! Coupon issuance
//!
//! [`CouponIssuer`] hands out exactly one code per session. The check for an
//! existing code and the insert of a new one happen under the session's map
//! shard lock, so concurrent messages from the same session cannot both mint.
//! Codes are checked against every code issued so far and are unique for the
//! lifetime of the process. Minting never fails: when random draws keep
//! colliding the issuer walks the code space in order, and only once every
//! code of the configured length is taken does it widen the suffix.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, DashSet};
use tracing::{debug, info, warn};

use crate::agent::session::{SessionRecord, SessionStatus, Ticket};
use crate::config::CouponConfig;
use crate::error::{Error, Result};

/// Characters used for the random suffix
pub const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Shortest suffix accepted by configuration (36^4 codes)
pub const MIN_SUFFIX_LEN: usize = 4;

/// Random draws before falling back to the sequential walk
const RANDOM_DRAWS: usize = 16;

/// Shape of the codes a [`CouponIssuer`] produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponPolicy {
    prefix: String,
    event_id: Option<String>,
    suffix_len: usize,
}

impl CouponPolicy {
    /// Create a policy; `event_id` is placed between prefix and suffix when set
    pub fn new(prefix: impl Into<String>, event_id: Option<String>, suffix_len: usize) -> Self {
        Self {
            prefix: prefix.into(),
            event_id,
            suffix_len,
        }
    }

    /// Fixed leading part of every code, including the trailing dash
    pub fn head(&self) -> String {
        match &self.event_id {
            Some(id) => format!("{}-{}-", self.prefix, id),
            None => format!("{}-", self.prefix),
        }
    }

    /// Check whether `code` has the shape this policy produces
    pub fn matches(&self, code: &str) -> bool {
        code.strip_prefix(self.head().as_str())
            .map(|suffix| {
                suffix.len() == self.suffix_len
                    && suffix.bytes().all(|b| SUFFIX_CHARSET.contains(&b))
            })
            .unwrap_or(false)
    }

    /// Number of distinct codes, `None` if it does not fit in a u64
    fn code_space(&self) -> Option<u64> {
        (SUFFIX_CHARSET.len() as u64).checked_pow(u32::try_from(self.suffix_len).ok()?)
    }

    fn random(&self, suffix_len: usize) -> String {
        let mut code = self.head();
        code.extend(
            (0..suffix_len).map(|_| SUFFIX_CHARSET[fastrand::usize(..SUFFIX_CHARSET.len())] as char),
        );
        code
    }

    // Base-36 rendering of `n`, left padded to the suffix length.
    fn sequential(&self, mut n: u64) -> String {
        let base = SUFFIX_CHARSET.len() as u64;
        let mut suffix = vec![SUFFIX_CHARSET[0]; self.suffix_len];
        for slot in suffix.iter_mut().rev() {
            *slot = SUFFIX_CHARSET[(n % base) as usize];
            n /= base;
        }
        let mut code = self.head();
        code.extend(suffix.into_iter().map(char::from));
        code
    }
}

impl From<&CouponConfig> for CouponPolicy {
    fn from(config: &CouponConfig) -> Self {
        Self::new(
            config.prefix.clone(),
            config.event_id.clone(),
            config.suffix_len,
        )
    }
}

/// Per-session coupon issuer
#[derive(Debug)]
pub struct CouponIssuer {
    policy: CouponPolicy,
    sessions: DashMap<String, Ticket>,
    issued: DashSet<String>,
    sequence: AtomicU64,
}

impl CouponIssuer {
    /// Create an issuer with an empty session map
    pub fn new(policy: CouponPolicy) -> Self {
        Self {
            policy,
            sessions: DashMap::new(),
            issued: DashSet::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Return the session's coupon, minting one on first use.
    ///
    /// Idempotent per session: once a code is stored it is returned verbatim
    /// on every later call.
    pub fn issue_or_get(&self, session_id: &str) -> Result<String> {
        validate_session_id(session_id)?;

        if let Some(ticket) = self.sessions.get(session_id) {
            return Ok(ticket.code.clone());
        }

        let mut minted = false;
        let ticket = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                minted = true;
                Ticket::new(self.mint())
            });
        let code = ticket.code.clone();
        drop(ticket);

        if minted {
            info!(session_id, coupon = %code, "Issued new coupon");
        } else {
            debug!(session_id, "Coupon already issued by a concurrent message");
        }
        Ok(code)
    }

    /// Look up the session's coupon without issuing one
    pub fn get(&self, session_id: &str) -> Option<String> {
        self.sessions.get(session_id).map(|t| t.code.clone())
    }

    /// Snapshot of a session's coupon state
    pub fn record(&self, session_id: &str) -> SessionRecord {
        SessionRecord {
            session_id: session_id.to_string(),
            ticket: self.sessions.get(session_id).map(|t| t.value().clone()),
        }
    }

    /// Coupon status of a session
    pub fn status(&self, session_id: &str) -> SessionStatus {
        if self.sessions.contains_key(session_id) {
            SessionStatus::Ticketed
        } else {
            SessionStatus::New
        }
    }

    /// Number of coupons issued so far
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// The code policy
    pub fn policy(&self) -> &CouponPolicy {
        &self.policy
    }

    // Reserve a code no other session holds.
    fn mint(&self) -> String {
        let policy = &self.policy;
        for _ in 0..RANDOM_DRAWS {
            let code = policy.random(policy.suffix_len);
            if self.issued.insert(code.clone()) {
                return code;
            }
            debug!(coupon = %code, "Coupon collision, drawing again");
        }

        let space = policy.code_space();
        loop {
            let n = self.sequence.fetch_add(1, Ordering::Relaxed);
            if space.is_some_and(|space| n >= space) {
                break;
            }
            let code = policy.sequential(n);
            if self.issued.insert(code.clone()) {
                return code;
            }
        }

        warn!(suffix_len = policy.suffix_len, "Coupon code space exhausted, widening suffix");
        let mut suffix_len = policy.suffix_len + 1;
        loop {
            for _ in 0..RANDOM_DRAWS {
                let code = policy.random(suffix_len);
                if self.issued.insert(code.clone()) {
                    return code;
                }
            }
            suffix_len += 1;
        }
    }
}

/// Reject empty or non-printable session identifiers
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.trim().is_empty() || session_id.chars().any(char::is_control) {
        return Err(Error::invalid_session(session_id));
    }
    Ok(())
}
