// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};

pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);
pub const MAX_TOAST_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub token: u64,
    pub message: String,
    pub kind: ToastKind,
    /// `None` when the deadline is past what `Instant` can represent.
    pub expires_at: Option<Instant>,
}

/// Single-slot toast. A new message replaces the old one and gets a fresh
/// token; expiry requests carrying an older token are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifier {
    ttl: Duration,
    current: Option<Toast>,
    next_token: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TTL)
    }
}

impl Notifier {
    /// `ttl` is capped at [`MAX_TOAST_TTL`].
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_TOAST_TTL),
            current: None,
            next_token: 1,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) -> u64 {
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        self.current = Some(Toast {
            token,
            message: message.into(),
            kind,
            expires_at: now.checked_add(self.ttl),
        });
        token
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn expire(&mut self, token: u64) -> bool {
        if self.current.as_ref().is_some_and(|toast| toast.token == token) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        if self
            .current
            .as_ref()
            .and_then(|toast| toast.expires_at)
            .is_some_and(|expires_at| now >= expires_at)
        {
            self.current = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}
