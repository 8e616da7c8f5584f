use std::sync::{Mutex, MutexGuard};

use folio_core::{ConfigError, OrchestrationConfig, Portfolio, content_from_json, default_content};
use folio_protocol::{AssetOutcome, PageGeometry, SectionId, TweenId, ViewUpdate};
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[derive(Debug, Error)]
enum BridgeError {
    #[error("portfolio registry poisoned")]
    Poisoned,
    #[error("invalid portfolio handle")]
    InvalidHandle,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Live portfolios, indexed by handle. Torn-down slots are emptied and
/// handed to the next `create_portfolio`.
#[derive(Default)]
struct Registry {
    slots: Vec<Option<Portfolio>>,
}

static PORTFOLIOS: Mutex<Registry> = Mutex::new(Registry { slots: Vec::new() });

fn registry() -> Result<MutexGuard<'static, Registry>, BridgeError> {
    PORTFOLIOS.lock().map_err(|_| BridgeError::Poisoned)
}

/// `performance.now()` is fractional and, in theory, could be negative.
fn clock_ms(now_ms: f64) -> u64 {
    if now_ms.is_finite() && now_ms > 0.0 {
        now_ms.floor() as u64
    } else {
        0
    }
}

fn geometry(json: &str) -> Result<PageGeometry, BridgeError> {
    Ok(serde_json::from_str(json)?)
}

/// Drain pending updates as a JSON array.
fn drain(portfolio: &mut Portfolio) -> Result<String, BridgeError> {
    let updates: Vec<ViewUpdate> = portfolio.drain_updates();
    Ok(serde_json::to_string(&updates)?)
}

impl Registry {
    fn create(&mut self, content_json: Option<&str>, config_json: Option<&str>, seed: u64) -> Result<usize, BridgeError> {
        let content = match content_json {
            Some(json) => content_from_json(json)?,
            None => default_content()?,
        };
        let config = match config_json {
            Some(json) => OrchestrationConfig::from_json(json)?,
            None => OrchestrationConfig::default(),
        };
        let portfolio = Portfolio::seeded(content, config, seed)?;

        match self.slots.iter().position(Option::is_none) {
            Some(handle) => {
                self.slots[handle] = Some(portfolio);
                Ok(handle)
            }
            None => {
                self.slots.push(Some(portfolio));
                Ok(self.slots.len() - 1)
            }
        }
    }

    fn get(&mut self, handle: usize) -> Result<&mut Portfolio, BridgeError> {
        self.slots
            .get_mut(handle)
            .and_then(Option::as_mut)
            .ok_or(BridgeError::InvalidHandle)
    }

    /// Run `f` on a live portfolio and return the updates it produced.
    fn update(&mut self, handle: usize, f: impl FnOnce(&mut Portfolio)) -> Result<String, BridgeError> {
        let portfolio = self.get(handle)?;
        f(portfolio);
        drain(portfolio)
    }

    /// Navigate by plain id or `#anchor`. A bare `#` names nothing.
    fn navigate(&mut self, handle: usize, section: &str, page: &PageGeometry) -> Result<String, BridgeError> {
        let target = SectionId::from_anchor(section);
        self.update(handle, |portfolio| {
            if let Some(id) = target {
                portfolio.navigate_to(&id, page);
            }
        })
    }

    fn teardown(&mut self, handle: usize) {
        if let Some(mut portfolio) = self.slots.get_mut(handle).and_then(Option::take) {
            portfolio.teardown();
        }
    }
}

/// Create a portfolio. Content and config are JSON; omitted content uses
/// the built-in record, omitted config the default cadence. Returns a
/// handle for the other calls.
#[wasm_bindgen]
pub fn create_portfolio(content_json: Option<String>, config_json: Option<String>, seed: u64) -> Result<usize, JsError> {
    Ok(registry()?.create(content_json.as_deref(), config_json.as_deref(), seed)?)
}

/// Start the loading screen. The result includes one `PreloadAsset` per
/// image to warm.
#[wasm_bindgen]
pub fn start(handle: usize) -> Result<String, JsError> {
    Ok(registry()?.update(handle, Portfolio::start)?)
}

/// Advance the clock to `now_ms` against the page as currently measured.
#[wasm_bindgen]
pub fn advance(handle: usize, now_ms: f64, geometry_json: &str) -> Result<String, JsError> {
    let page = geometry(geometry_json)?;
    Ok(registry()?.update(handle, |portfolio| portfolio.advance_to(clock_ms(now_ms), &page))?)
}

/// Report that an asset finished warming, `loaded` or not.
#[wasm_bindgen]
pub fn asset_settled(handle: usize, url: &str, loaded: bool) -> Result<String, JsError> {
    let outcome = if loaded {
        AssetOutcome::Loaded
    } else {
        AssetOutcome::Failed
    };
    Ok(registry()?.update(handle, |portfolio| {
        portfolio.asset_settled(url, outcome);
    })?)
}

/// Scroll or resize listener.
#[wasm_bindgen]
pub fn on_scroll(handle: usize) -> Result<String, JsError> {
    Ok(registry()?.update(handle, Portfolio::on_scroll)?)
}

/// IntersectionObserver callback for a counter or bar.
#[wasm_bindgen]
pub fn on_visibility(handle: usize, tween_id: u32, visible: bool) -> Result<String, JsError> {
    Ok(registry()?.update(handle, |portfolio| {
        portfolio.on_visibility(TweenId(tween_id), visible);
    })?)
}

/// Navigation click or call-to-action, by id or by `#anchor`. The result
/// carries the `ScrollTo` to perform, if the section exists.
#[wasm_bindgen]
pub fn navigate_to(handle: usize, section: &str, geometry_json: &str) -> Result<String, JsError> {
    let page = geometry(geometry_json)?;
    Ok(registry()?.navigate(handle, section, &page)?)
}

#[wasm_bindgen]
pub fn toggle_menu(handle: usize) -> Result<String, JsError> {
    Ok(registry()?.update(handle, |portfolio| {
        portfolio.toggle_menu();
    })?)
}

/// Close the mobile menu, e.g. on a backdrop click.
#[wasm_bindgen]
pub fn close_menu(handle: usize) -> Result<String, JsError> {
    Ok(registry()?.update(handle, Portfolio::close_menu)?)
}

/// Id of the highlighted section, if sections are registered.
#[wasm_bindgen]
pub fn active_section(handle: usize) -> Result<Option<String>, JsError> {
    let mut portfolios = registry()?;
    Ok(portfolios.get(handle)?.active_section().map(ToString::to_string))
}

/// Release every timer and free the handle for reuse.
#[wasm_bindgen]
pub fn teardown(handle: usize) -> Result<(), JsError> {
    registry()?.teardown(handle);
    Ok(())
}
