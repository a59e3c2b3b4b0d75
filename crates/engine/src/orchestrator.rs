use crate::error::EngineError;
use crate::reconciler::{Discrepancy, StateReconciler};
use crate::CANDLE_INTERVAL;
use api_client::MarketDataProvider;
use chrono::{Days, NaiveDate, NaiveTime};
use configuration::{Config, InstrumentConfig};
use core_types::{Candle, HunterZone, OptionChainSnapshot, Timestamp, Trade};
use executor::{OrderGateway, PaperPosition, PositionLedger};
use risk::StopLossMonitor;
use rust_decimal::Decimal;
use signals::{
    DayClassifier, IndicatorValues, VolumePatternDetector, calculate_pcr, microstructure_score,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use strategies::{SkipReason, StrategyContext, TemplateBook, TemplateOutcome};

/// High and low of the candles at or after `zone_start` on the last trading day before
/// `before`. `None` when no such candles exist.
pub fn hunter_zone_from_candles(
    candles: &[Candle],
    zone_start: NaiveTime,
    before: NaiveDate,
) -> Option<HunterZone> {
    let last_day = candles
        .iter()
        .map(|c| c.timestamp.date_naive())
        .filter(|d| *d < before)
        .max()?;

    let (high, low) = candles
        .iter()
        .filter(|c| c.timestamp.date_naive() == last_day && c.timestamp.time() >= zone_start)
        .fold(None, |acc: Option<(Decimal, Decimal)>, c| {
            Some(match acc {
                None => (c.high, c.low),
                Some((high, low)) => (high.max(c.high), low.min(c.low)),
            })
        })?;
    Some(HunterZone { high, low })
}

/// Open of the first candle of the latest session in the series.
pub fn session_open(candles: &[Candle]) -> Option<Decimal> {
    let today = candles.last()?.timestamp.date_naive();
    candles
        .iter()
        .find(|c| c.timestamp.date_naive() == today)
        .map(|c| c.open)
}

/// Runs decision cycles and owns all per-instrument state.
pub struct StrategyOrchestrator {
    config: Config,
    provider: Arc<dyn MarketDataProvider>,
    gateway: Arc<dyn OrderGateway>,
    ledger: PositionLedger,
    templates: TemplateBook,
    classifier: DayClassifier,
    detector: VolumePatternDetector,
    monitor: StopLossMonitor,
    hunter_zones: HashMap<String, HunterZone>,
    last_processed: HashMap<String, Timestamp>,
    /// Latest non-zero volume seen per instrument, for volume proxies.
    volume_cache: HashMap<String, Decimal>,
}

impl StrategyOrchestrator {
    pub fn new(
        config: Config,
        provider: Arc<dyn MarketDataProvider>,
        gateway: Arc<dyn OrderGateway>,
    ) -> Result<Self, EngineError> {
        let templates = TemplateBook::new(&config)?;
        Ok(Self {
            classifier: DayClassifier::new(config.day_classifier.clone()),
            detector: VolumePatternDetector::from(&config.volume_analysis),
            monitor: StopLossMonitor::new(),
            templates,
            config,
            provider,
            gateway,
            ledger: PositionLedger::new(),
            hunter_zones: HashMap::new(),
            last_processed: HashMap::new(),
            volume_cache: HashMap::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> Arc<dyn MarketDataProvider> {
        Arc::clone(&self.provider)
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn into_ledger(self) -> PositionLedger {
        self.ledger
    }

    pub fn is_tracked(&self, instrument: &str) -> bool {
        self.config.instrument(instrument).is_some()
    }

    pub fn hunter_zone(&self, instrument: &str) -> Option<HunterZone> {
        self.hunter_zones.get(instrument).copied()
    }

    pub fn set_hunter_zone(&mut self, instrument: &str, zone: HunterZone) {
        self.hunter_zones.insert(instrument.to_string(), zone);
    }

    /// Remembers the latest volume of an instrument (typically an index future) so it can
    /// stand in for an instrument that reports none.
    pub fn record_volume(&mut self, instrument: &str, volume: Decimal) {
        if !volume.is_zero() {
            self.volume_cache.insert(instrument.to_string(), volume);
        }
    }

    pub fn cached_volume(&self, instrument: &str) -> Option<Decimal> {
        self.volume_cache.get(instrument).copied()
    }

    /// Recomputes the hunter zone of every tracked instrument from the last session before
    /// `reference` within the configured lookback. Returns how many zones were set.
    /// Instruments without usable history lose the zone of the previous session.
    pub async fn calculate_hunter_zone(&mut self, reference: NaiveDate) -> usize {
        tracing::info!(%reference, "Calculating Hunter Zone...");
        let session = &self.config.session;
        let from = reference
            .checked_sub_days(Days::new(u64::from(session.hunter_zone_lookback_days)))
            .unwrap_or(reference);
        let to = reference.pred_opt().unwrap_or(reference);
        let zone_start = session.hunter_zone_start;

        let keys: Vec<String> = self.config.instruments.iter().map(|i| i.key.clone()).collect();
        let mut computed = 0;
        for key in keys {
            let candles = match self
                .provider
                .get_historical_candles(&key, CANDLE_INTERVAL, from, to)
                .await
            {
                Ok(candles) => candles,
                Err(e) => {
                    tracing::error!(instrument = %key, error = %e, "Failed to fetch history for Hunter Zone");
                    self.hunter_zones.remove(&key);
                    continue;
                }
            };
            match hunter_zone_from_candles(&candles, zone_start, reference) {
                Some(zone) => {
                    tracing::info!(instrument = %key, high = %zone.high, low = %zone.low, "Hunter Zone set");
                    self.hunter_zones.insert(key, zone);
                    computed += 1;
                }
                None => {
                    tracing::warn!(instrument = %key, "No prior-session data found for Hunter Zone");
                    self.hunter_zones.remove(&key);
                }
            }
        }
        computed
    }

    /// Exits the instrument's position if `price` crossed its stop.
    pub async fn monitor_stop_loss(
        &mut self,
        instrument: &str,
        price: Decimal,
        time: Timestamp,
    ) -> Result<Option<Trade>, EngineError> {
        Ok(self
            .monitor
            .enforce(instrument, price, time, &mut self.ledger, self.gateway.as_ref())
            .await?)
    }

    /// Runs one full decision cycle for `instrument` on its candle series (oldest first).
    ///
    /// The stop-loss check runs first; a stop-out ends the cycle. The option chain is
    /// fetched from the provider when none is supplied.
    pub async fn execute_strategy(
        &mut self,
        instrument: &str,
        candles: &[Candle],
        timestamp: Timestamp,
        option_chain: Option<&OptionChainSnapshot>,
    ) -> Result<TemplateOutcome, EngineError> {
        let Some(latest) = candles.last() else {
            return Ok(TemplateOutcome::Skipped(SkipReason::MissingReferenceData));
        };
        if self
            .last_processed
            .get(instrument)
            .is_some_and(|seen| *seen >= latest.timestamp)
        {
            tracing::debug!(instrument, candle = %latest.timestamp, "Candle already processed");
            return Ok(TemplateOutcome::Skipped(SkipReason::DuplicateCandle));
        }
        let settings = self
            .config
            .instrument(instrument)
            .cloned()
            .ok_or_else(|| EngineError::UnknownInstrument(instrument.to_string()))?;
        self.last_processed
            .insert(instrument.to_string(), latest.timestamp);
        self.record_volume(instrument, latest.volume);
        let price = latest.close;

        if let Some(trade) = self.monitor_stop_loss(instrument, price, timestamp).await? {
            return Ok(TemplateOutcome::Exited(trade));
        }

        let Some(zone) = self.hunter_zone(instrument) else {
            tracing::warn!(instrument, "Hunter Zone not available. Skipping.");
            return Ok(TemplateOutcome::Skipped(SkipReason::MissingReferenceData));
        };

        let candles = self.with_proxy_volume(&settings, candles);

        let chain = match option_chain {
            Some(chain) => Cow::Borrowed(chain),
            None => Cow::Owned(self.fetch_option_chain(&settings).await?),
        };
        if chain.is_empty() {
            tracing::warn!(instrument, underlying = %settings.underlying, "Option chain is empty. Skipping.");
            return Ok(TemplateOutcome::Skipped(SkipReason::MissingReferenceData));
        }
        let Some(pcr) = calculate_pcr(&chain) else {
            tracing::warn!(instrument, "PCR undefined (no call open interest). Skipping.");
            return Ok(TemplateOutcome::Skipped(SkipReason::MissingReferenceData));
        };
        let Some(opening_price) = session_open(&candles) else {
            return Ok(TemplateOutcome::Skipped(SkipReason::MissingReferenceData));
        };

        let day_type = self.classifier.classify_zone(opening_price, &zone, pcr);
        let indicators =
            IndicatorValues::compute(&candles, &self.config.microstructure, &self.config.stop_loss)?;
        let score = microstructure_score(price, indicators.evwma_short, indicators.evwma_long);
        let vpa = self.detector.detect(&candles);
        let volume_confirmed = !self.config.volume_analysis.enabled || vpa.confirms(score);

        tracing::info!(
            instrument,
            %day_type,
            score,
            %pcr,
            %price,
            vpa = ?vpa.label(),
            "Decision cycle"
        );
        if !volume_confirmed {
            tracing::info!(instrument, score, "VPA signals do not confirm the microstructure score.");
        }

        let ctx = StrategyContext {
            instrument,
            timestamp,
            price,
            score,
            pcr: Some(pcr),
            day_type,
            hunter_zone: zone,
            option_chain: &chain,
            indicators,
            vpa,
            volume_confirmed,
            candles: &candles,
            strike_step: settings.strike_step,
            quantity: self.config.execution.order_quantity,
        };
        let template = self.templates.for_day(day_type);
        let outcome = template
            .execute(&ctx, &mut self.ledger, self.gateway.as_ref())
            .await?;

        match &outcome {
            TemplateOutcome::Skipped(reason) => {
                tracing::debug!(instrument, template = %template.kind(), %reason, "No action")
            }
            other => tracing::info!(instrument, template = %template.kind(), outcome = ?other, "Template acted"),
        }
        Ok(outcome)
    }

    /// Compares the ledger with a paper-position mirror and logs every mismatch.
    pub fn reconcile(&self, mirror: &[PaperPosition]) -> Vec<Discrepancy> {
        StateReconciler::run_reconciliation(&self.ledger, mirror)
    }

    async fn fetch_option_chain(
        &self,
        settings: &InstrumentConfig,
    ) -> Result<OptionChainSnapshot, EngineError> {
        let expiry = match settings.expiry {
            Some(expiry) => Some(expiry),
            None => self.provider.nearest_expiry(&settings.underlying).await?,
        };
        Ok(self
            .provider
            .get_option_chain(&settings.underlying, expiry)
            .await?)
    }

    /// Replaces a zero latest volume with the proxy instrument's cached volume.
    fn with_proxy_volume<'a>(
        &self,
        settings: &InstrumentConfig,
        candles: &'a [Candle],
    ) -> Cow<'a, [Candle]> {
        let (Some(proxy), Some(latest)) = (settings.volume_proxy.as_deref(), candles.last()) else {
            return Cow::Borrowed(candles);
        };
        if !latest.volume.is_zero() {
            return Cow::Borrowed(candles);
        }
        let Some(volume) = self.volume_cache.get(proxy).copied() else {
            return Cow::Borrowed(candles);
        };

        tracing::info!(instrument = %settings.key, proxy, %volume, "Substituted volume from proxy");
        let mut owned = candles.to_vec();
        if let Some(last) = owned.last_mut() {
            last.volume = volume;
        }
        Cow::Owned(owned)
    }
}
