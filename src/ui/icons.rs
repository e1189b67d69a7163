//! Shared UI icons.
//!
//! Each icon falls back to plain ASCII on terminals without emoji support.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");

// Board indicators
pub static COLUMN: Emoji<'_, '_> = Emoji("▌", "|");
pub static ARROW: Emoji<'_, '_> = Emoji("→", "->");
pub static LOCK: Emoji<'_, '_> = Emoji("🔒 ", "[private] ");
pub static USER: Emoji<'_, '_> = Emoji("👤 ", "@");
