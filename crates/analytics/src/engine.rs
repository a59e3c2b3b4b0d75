use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use core_types::Trade;
use rust_decimal::Decimal;
use std::time::Duration;

/// A stateless calculator for deriving performance metrics from closed trades.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the report for `trades`, in any order. Break-even trades count towards the
    /// total but are neither winners nor losers.
    pub fn calculate(&self, trades: &[Trade]) -> Result<PerformanceReport, AnalyticsError> {
        let mut report = PerformanceReport::new();
        if trades.is_empty() {
            return Ok(report);
        }

        let mut ordered: Vec<&Trade> = trades.iter().collect();
        ordered.sort_by_key(|t| t.exit_time);

        self.calculate_profitability(&ordered, &mut report);
        report.max_drawdown = Self::max_drawdown(&ordered);
        report.average_holding_period = Self::average_holding_period(&ordered)?;

        tracing::debug!(
            trades = report.total_trades,
            pnl = %report.total_pnl,
            drawdown = %report.max_drawdown,
            "Performance report calculated"
        );
        Ok(report)
    }

    fn trade_pnl(trade: &Trade) -> Decimal {
        trade.pnl * Decimal::from(trade.quantity)
    }

    fn calculate_profitability(&self, trades: &[&Trade], report: &mut PerformanceReport) {
        report.total_trades = trades.len();

        for trade in trades {
            let pnl = Self::trade_pnl(trade);
            report.total_pnl += pnl;

            if pnl > Decimal::ZERO {
                report.gross_profit += pnl;
                report.winning_trades += 1;
            } else if pnl < Decimal::ZERO {
                report.gross_loss += pnl.abs();
                report.losing_trades += 1;
            }
        }

        // --- Ratios ---
        if report.gross_loss > Decimal::ZERO {
            report.profit_factor = Some(report.gross_profit / report.gross_loss);
        }

        report.win_rate_pct = Some(
            Decimal::from(report.winning_trades) / Decimal::from(report.total_trades)
                * Decimal::ONE_HUNDRED,
        );

        if report.winning_trades > 0 {
            report.average_win = report.gross_profit / Decimal::from(report.winning_trades);
        }
        if report.losing_trades > 0 {
            report.average_loss = report.gross_loss / Decimal::from(report.losing_trades);
            report.payoff_ratio = Some(report.average_win / report.average_loss);
        }
    }

    /// Peak-to-trough fall of the cumulative PnL curve, which starts at zero.
    fn max_drawdown(trades: &[&Trade]) -> Decimal {
        let mut equity = Decimal::ZERO;
        let mut peak = Decimal::ZERO;
        let mut max_drawdown = Decimal::ZERO;

        for trade in trades {
            equity += Self::trade_pnl(trade);
            peak = peak.max(equity);
            max_drawdown = max_drawdown.max(peak - equity);
        }
        max_drawdown
    }

    fn average_holding_period(trades: &[&Trade]) -> Result<Duration, AnalyticsError> {
        let mut total_secs: u64 = 0;
        for trade in trades {
            let held = (trade.exit_time - trade.entry_time).num_seconds();
            let held = u64::try_from(held)
                .map_err(|_| AnalyticsError::InvalidTrade(trade.trade_id.to_string()))?;
            total_secs += held;
        }
        let count = u64::try_from(trades.len())
            .map_err(|e| AnalyticsError::Calculation(e.to_string()))?;
        Ok(Duration::from_secs(total_secs / count.max(1)))
    }
}
