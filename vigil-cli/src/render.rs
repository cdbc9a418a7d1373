//! Terminal renderers for the streamed account state.
//!
//! The dashboard keeps the last successfully decoded value of each section. A
//! payload that fails to decode leaves the previous value on screen.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::sync::Arc;
use vigil_core::account::{AccountInfo, PnlSnapshot, Position};
use vigil_gateway::relay::{DispatchRegistry, MessageType};

const NOT_AVAILABLE: &str = "N/A";

/// Last known account state.
#[derive(Debug, Default)]
pub struct Dashboard {
    account: Option<AccountInfo>,
    positions: Vec<Position>,
    pnl: Option<PnlSnapshot>,
}

impl Dashboard {
    /// Creates an empty, shareable dashboard.
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    /// Registers one typed subscriber per message type. Each prints its
    /// section after updating the state.
    pub fn attach(dashboard: &Arc<Mutex<Self>>, registry: &DispatchRegistry) {
        let state = Arc::clone(dashboard);
        registry.subscribe_typed(MessageType::AccountInfo, move |info: AccountInfo| {
            let rendered = render_account(&info);
            state.lock().account = Some(info);
            println!("{rendered}");
            Ok(())
        });

        let state = Arc::clone(dashboard);
        registry.subscribe_typed(MessageType::Positions, move |positions: Vec<Position>| {
            let rendered = render_positions(&positions);
            state.lock().positions = positions;
            println!("{rendered}");
            Ok(())
        });

        let state = Arc::clone(dashboard);
        registry.subscribe_typed(MessageType::Pnl, move |pnl: PnlSnapshot| {
            let rendered = render_pnl(&pnl);
            state.lock().pnl = Some(pnl);
            println!("{rendered}");
            Ok(())
        });
    }

    /// Renders every section that has received data.
    pub fn render(&self) -> String {
        let mut sections = Vec::new();
        if let Some(account) = &self.account {
            sections.push(render_account(account));
        }
        sections.push(render_positions(&self.positions));
        if let Some(pnl) = &self.pnl {
            sections.push(render_pnl(pnl));
        }
        sections.join("\n")
    }
}

/// Renders the account header.
pub fn render_account(info: &AccountInfo) -> String {
    let status = if info.status { "Active" } else { "Inactive" };
    format!(
        "Account Information\n  Name:   {}\n  ID:     {}\n  Status: {status}",
        info.name, info.id
    )
}

/// Renders the positions table. Missing numbers show as `N/A`, a missing
/// P&L as `0.00`.
pub fn render_positions(positions: &[Position]) -> String {
    let mut out = String::from("Positions\n");
    if positions.is_empty() {
        out.push_str("  No open positions");
        return out;
    }

    let _ = writeln!(
        out,
        "  {:<10} {:>8} {:>12} {:>12} {:>12}",
        "Symbol", "Net Pos", "Entry Price", "Market Price", "P&L"
    );
    for position in positions {
        let _ = writeln!(
            out,
            "  {:<10} {:>8} {:>12} {:>12} {:>12}",
            position.symbol,
            position
                .net_pos
                .map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.normalize().to_string()),
            price(position.entry_price),
            price(position.market_price),
            money(position.pnl),
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// Renders the P&L summary with two decimals; missing values show as `0.00`.
pub fn render_pnl(pnl: &PnlSnapshot) -> String {
    format!(
        "Profit & Loss\n  Net:        {}\n  Realized:   {}\n  Unrealized: {}",
        money(pnl.net_pnl),
        money(pnl.realized_pnl),
        money(pnl.unrealized_pnl),
    )
}

fn price(value: Option<Decimal>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

fn money(value: Option<Decimal>) -> String {
    format!("{:.2}", value.unwrap_or_default())
}
