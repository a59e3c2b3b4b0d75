use crate::orchestrator::StrategyOrchestrator;
use crate::reconciler::Discrepancy;
use chrono::{NaiveDate, Timelike};
use core_types::{Candle, Tick, Timestamp};
use executor::SimulatedGateway;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

fn minute_start(time: Timestamp) -> Timestamp {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

/// Builds one-minute candles from ticks, one candle in progress per instrument.
#[derive(Debug, Default)]
pub struct CandleAggregator {
    building: HashMap<String, Candle>,
}

impl CandleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `tick` into its instrument's candle. Returns the previous candle once a tick
    /// from a later minute arrives. Ticks older than the candle in progress are dropped.
    pub fn on_tick(&mut self, tick: &Tick) -> Option<Candle> {
        let minute = minute_start(tick.timestamp);

        if let Some(candle) = self.building.get_mut(&tick.instrument) {
            if minute == candle.timestamp {
                candle.high = candle.high.max(tick.last_price);
                candle.low = candle.low.min(tick.last_price);
                candle.close = tick.last_price;
                candle.volume += tick.last_qty;
                return None;
            }
            if minute < candle.timestamp {
                tracing::debug!(instrument = %tick.instrument, at = %tick.timestamp, "Dropping late tick");
                return None;
            }
        }

        let fresh = Candle {
            timestamp: minute,
            open: tick.last_price,
            high: tick.last_price,
            low: tick.last_price,
            close: tick.last_price,
            volume: tick.last_qty,
            open_interest: Decimal::ZERO,
        };
        self.building.insert(tick.instrument.clone(), fresh)
    }

    pub fn in_progress(&self, instrument: &str) -> Option<&Candle> {
        self.building.get(instrument)
    }
}

/// Drives the orchestrator from a pushed tick stream.
///
/// Stops are checked on every tick of a tracked instrument. A decision cycle runs each
/// time a minute candle completes. Completed candles of untracked instruments only feed
/// the proxy-volume cache. The first tick of a new date recomputes the hunter zones, and
/// each instrument's candle history restarts with the session.
pub struct TickDriver {
    orchestrator: StrategyOrchestrator,
    aggregator: CandleAggregator,
    history: HashMap<String, Vec<Candle>>,
    ticks: mpsc::Receiver<Tick>,
    shutdown: watch::Receiver<bool>,
    zones_for: Option<NaiveDate>,
    paper_mirror: Option<Arc<SimulatedGateway>>,
}

impl TickDriver {
    pub fn new(
        orchestrator: StrategyOrchestrator,
        ticks: mpsc::Receiver<Tick>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            orchestrator,
            aggregator: CandleAggregator::new(),
            history: HashMap::new(),
            ticks,
            shutdown,
            zones_for: None,
            paper_mirror: None,
        }
    }

    /// The paper gateway to reconcile against when `run` starts.
    pub fn with_paper_mirror(mut self, mirror: Option<Arc<SimulatedGateway>>) -> Self {
        self.paper_mirror = mirror;
        self
    }

    /// Preloads the session's earlier candles so indicators are defined from the first
    /// completed minute.
    pub fn seed_history(&mut self, instrument: &str, candles: Vec<Candle>) {
        self.history.insert(instrument.to_string(), candles);
    }

    pub fn orchestrator(&self) -> &StrategyOrchestrator {
        &self.orchestrator
    }

    pub fn history(&self, instrument: &str) -> &[Candle] {
        self.history.get(instrument).map_or(&[], Vec::as_slice)
    }

    pub async fn reconcile_on_startup(&self) -> Vec<Discrepancy> {
        match &self.paper_mirror {
            Some(mirror) => self.orchestrator.reconcile(&mirror.paper_positions().await),
            None => Vec::new(),
        }
    }

    pub async fn on_tick(&mut self, tick: Tick) {
        let date = tick.timestamp.date_naive();
        if self.zones_for.is_none_or(|current| current < date) {
            self.orchestrator.calculate_hunter_zone(date).await;
            self.zones_for = Some(date);
        }

        let tracked = self.orchestrator.is_tracked(&tick.instrument);
        if tracked {
            if let Err(e) = self
                .orchestrator
                .monitor_stop_loss(&tick.instrument, tick.last_price, tick.timestamp)
                .await
            {
                tracing::error!(instrument = %tick.instrument, error = %e, "Stop-loss check failed");
            }
        }

        let Some(completed) = self.aggregator.on_tick(&tick) else {
            return;
        };
        if !tracked {
            self.orchestrator
                .record_volume(&tick.instrument, completed.volume);
            return;
        }

        let history = self.history.entry(tick.instrument.clone()).or_default();
        let session = completed.timestamp.date_naive();
        if history.last().is_some_and(|c| c.timestamp.date_naive() != session) {
            history.clear();
        }
        history.push(completed);
        if let Err(e) = self
            .orchestrator
            .execute_strategy(&tick.instrument, history, tick.timestamp, None)
            .await
        {
            tracing::error!(instrument = %tick.instrument, error = %e, "Decision cycle failed");
        }
    }

    /// Consumes ticks until the stream closes or shutdown is signalled.
    pub async fn run(mut self) -> StrategyOrchestrator {
        tracing::info!("Starting tick driver...");
        let discrepancies = self.reconcile_on_startup().await;
        if !discrepancies.is_empty() {
            tracing::warn!(count = discrepancies.len(), "Ledger and paper mirror disagree at start-up");
        }
        loop {
            if *self.shutdown.borrow() {
                break;
            }
            let next = tokio::select! {
                _ = self.shutdown.changed() => None,
                tick = self.ticks.recv() => tick,
            };
            let Some(tick) = next else {
                break;
            };
            self.on_tick(tick).await;
        }
        tracing::info!("Tick driver stopped.");
        self.orchestrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn tick(at: &str, price: Decimal, qty: Decimal) -> Tick {
        Tick {
            instrument: "NSE_FO|NIFTY24MARFUT".to_string(),
            last_price: price,
            last_qty: qty,
            timestamp: DateTime::parse_from_rfc3339(at).unwrap(),
        }
    }

    #[test]
    fn ticks_within_a_minute_build_one_candle() {
        let mut aggregator = CandleAggregator::new();
        assert!(aggregator.on_tick(&tick("2024-03-01T10:00:05+05:30", dec!(100), dec!(5))).is_none());
        assert!(aggregator.on_tick(&tick("2024-03-01T10:00:20+05:30", dec!(103), dec!(2))).is_none());
        assert!(aggregator.on_tick(&tick("2024-03-01T10:00:59+05:30", dec!(99), dec!(1))).is_none());

        let candle = aggregator
            .on_tick(&tick("2024-03-01T10:01:00+05:30", dec!(101), dec!(4)))
            .unwrap();
        assert_eq!(candle.timestamp, DateTime::parse_from_rfc3339("2024-03-01T10:00:00+05:30").unwrap());
        assert_eq!((candle.open, candle.high, candle.low, candle.close), (dec!(100), dec!(103), dec!(99), dec!(99)));
        assert_eq!(candle.volume, dec!(8));

        let next = aggregator.in_progress("NSE_FO|NIFTY24MARFUT").unwrap();
        assert_eq!(next.open, dec!(101));
        assert_eq!(next.volume, dec!(4));
    }

    #[test]
    fn late_ticks_are_dropped() {
        let mut aggregator = CandleAggregator::new();
        aggregator.on_tick(&tick("2024-03-01T10:01:10+05:30", dec!(100), dec!(1)));
        assert!(aggregator.on_tick(&tick("2024-03-01T10:00:50+05:30", dec!(90), dec!(1))).is_none());

        let candle = aggregator.in_progress("NSE_FO|NIFTY24MARFUT").unwrap();
        assert_eq!(candle.low, dec!(100));
        assert_eq!(candle.volume, dec!(1));
    }

    mod driver {
        use super::*;
        use crate::test_support::{
            FakeMarket, NIFTY, NIFTY_FUT, at, bullish_chain, config, orchestrator,
            prior_final_hour, rising_session, zone,
        };
        use chrono::Duration;
        use core_types::{Direction, HunterZone};
        use executor::OrderGateway;

        #[tokio::test]
        async fn tick_through_the_stop_closes_the_position() {
            let (mut orch, gateway) = orchestrator(config(), Arc::new(FakeMarket::default()));
            orch.set_hunter_zone(NIFTY, zone());
            let candles = rising_session(120);
            orch.execute_strategy(NIFTY, &candles, candles[119].timestamp, Some(&bullish_chain()))
                .await
                .unwrap();
            assert!(orch.ledger().is_open(NIFTY));

            let (_tx, ticks) = mpsc::channel(8);
            let (_stop, shutdown) = watch::channel(false);
            let mut driver = TickDriver::new(orch, ticks, shutdown);
            driver.seed_history(NIFTY, candles);

            driver
                .on_tick(Tick {
                    instrument: NIFTY.to_string(),
                    last_price: dec!(22190),
                    last_qty: Decimal::ZERO,
                    timestamp: at("2024-03-01T11:15:10+05:30"),
                })
                .await;

            assert!(!driver.orchestrator().ledger().is_open(NIFTY));
            assert_eq!(driver.orchestrator().ledger().list_trades().len(), 1);
            assert!(gateway.paper_positions().await.is_empty());
        }

        #[tokio::test]
        async fn completed_proxy_candles_feed_the_volume_cache() {
            let (orch, _gateway) = orchestrator(config(), Arc::new(FakeMarket::default()));
            let (tx, ticks) = mpsc::channel(8);
            let (_stop, shutdown) = watch::channel(false);
            let driver = TickDriver::new(orch, ticks, shutdown);

            for (at_time, qty) in [
                ("2024-03-01T10:00:05+05:30", dec!(300)),
                ("2024-03-01T10:00:40+05:30", dec!(200)),
                ("2024-03-01T10:01:00+05:30", dec!(50)),
            ] {
                tx.send(Tick {
                    instrument: NIFTY_FUT.to_string(),
                    last_price: dec!(22050),
                    last_qty: qty,
                    timestamp: at(at_time),
                })
                .await
                .unwrap();
            }
            drop(tx);

            let orch = driver.run().await;
            assert_eq!(orch.cached_volume(NIFTY_FUT), Some(dec!(500)));
            assert!(orch.ledger().list_trades().is_empty());
        }

        fn nifty_tick(at_time: &str) -> Tick {
            Tick {
                instrument: NIFTY.to_string(),
                last_price: dec!(22150),
                last_qty: dec!(10),
                timestamp: at(at_time),
            }
        }

        #[tokio::test]
        async fn a_new_date_recomputes_zones_and_restarts_history() {
            // Final hours of 29 Feb (21900..22100) and 1 Mar (22000..22200).
            let mut history = prior_final_hour();
            history.extend(prior_final_hour().into_iter().map(|mut c| {
                c.timestamp = c.timestamp + Duration::days(1);
                c.high += dec!(100);
                c.low += dec!(100);
                c
            }));
            let mut histories = HashMap::new();
            histories.insert(NIFTY.to_string(), history);
            let market = Arc::new(FakeMarket {
                history: histories,
                ..Default::default()
            });
            let (orch, _gateway) = orchestrator(config(), market.clone());
            let (_tx, ticks) = mpsc::channel(8);
            let (_stop, shutdown) = watch::channel(false);
            let mut driver = TickDriver::new(orch, ticks, shutdown);

            driver.on_tick(nifty_tick("2024-03-01T10:00:05+05:30")).await;
            assert_eq!(driver.orchestrator().hunter_zone(NIFTY), Some(zone()));
            driver.on_tick(nifty_tick("2024-03-01T10:01:05+05:30")).await;
            assert_eq!(driver.history(NIFTY).len(), 1);

            // Monday's first ticks complete Friday's last candle, then Monday's first.
            driver.on_tick(nifty_tick("2024-03-04T09:15:05+05:30")).await;
            assert_eq!(
                driver.orchestrator().hunter_zone(NIFTY),
                Some(HunterZone {
                    high: dec!(22200),
                    low: dec!(22000),
                })
            );
            assert_eq!(driver.history(NIFTY).len(), 2);

            driver.on_tick(nifty_tick("2024-03-04T09:16:05+05:30")).await;
            let history = driver.history(NIFTY);
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].timestamp, at("2024-03-04T09:15:00+05:30"));

            let zone_requests: Vec<String> = market
                .requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.starts_with("history"))
                .cloned()
                .collect();
            assert_eq!(
                zone_requests,
                vec![
                    format!("history {NIFTY} 2024-02-20 2024-02-29"),
                    format!("history {NIFTY} 2024-02-23 2024-03-03"),
                ]
            );
        }

        #[tokio::test]
        async fn startup_reconciliation_uses_the_paper_mirror() {
            let (orch, gateway) = orchestrator(config(), Arc::new(FakeMarket::default()));
            gateway.place_entry("PE-22000", Direction::Bear, 1).await.unwrap();
            let (_tx, ticks) = mpsc::channel(8);
            let (_stop, shutdown) = watch::channel(false);

            let driver = TickDriver::new(orch, ticks, shutdown).with_paper_mirror(Some(gateway));
            assert_eq!(
                driver.reconcile_on_startup().await,
                vec![Discrepancy::Untracked {
                    option: "PE-22000".to_string()
                }]
            );
        }
    }
}
