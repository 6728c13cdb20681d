// ============================================================================
// Widget TradingView
// ============================================================================
// Génère le code d'intégration du graphique interactif TradingView
// pour un symbole widget (ex: "OANDA:XAUUSD").
//
// Un terminal ne peut pas exécuter le widget : le TUI affiche le lien
// vers le graphique, et --export-widget écrit le HTML dans un fichier.
// ============================================================================

use serde_json::json;

/// Script chargé par le widget
const TV_SCRIPT_URL: &str = "https://s3.tradingview.com/tv.js";

/// Page graphique TradingView
const TV_CHART_URL: &str = "https://www.tradingview.com/chart/?symbol=";

/// Thème du widget (le dashboard est toujours sombre)
const TV_THEME: &str = "dark";

/// Paramètres du widget TradingView
#[derive(Debug, Clone, PartialEq)]
pub struct TradingViewWidget {
    /// Symbole TradingView (ex: "OANDA:EURUSD")
    pub symbol: String,
    /// Largeur CSS (ex: "100%")
    pub width: String,
    /// Hauteur en pixels
    pub height: u32,
    /// Intervalle TradingView en minutes ("60" = 1h)
    pub interval: String,
    pub timezone: String,
    pub locale: String,
}

impl TradingViewWidget {
    /// Widget avec les réglages par défaut du dashboard
    pub fn for_symbol(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            width: "100%".to_string(),
            height: 520,
            interval: "60".to_string(),
            timezone: "Etc/UTC".to_string(),
            locale: "en".to_string(),
        }
    }

    /// Identifiant HTML du conteneur
    ///
    /// ":" n'est pas sûr dans un id : "OANDA:XAUUSD" -> "tradingview_OANDA_XAUUSD"
    pub fn container_id(&self) -> String {
        format!("tradingview_{}", self.symbol.replace(':', "_"))
    }

    /// Hauteur du cadre qui contient le widget (marge pour la barre d'outils)
    pub fn frame_height(&self) -> u32 {
        self.height + 40
    }

    /// Configuration passée à `new TradingView.widget(...)`
    ///
    /// CONCEPT : json! plutôt que format!
    /// - serde_json échappe les chaînes, le symbole ne peut pas casser le script
    pub fn config_json(&self) -> serde_json::Value {
        json!({
            "width": self.width,
            "height": self.height,
            "symbol": self.symbol,
            "interval": self.interval,
            "timezone": self.timezone,
            "theme": TV_THEME,
            "style": "1",
            "locale": self.locale,
            "toolbar_bg": "#f1f3f6",
            "enable_publishing": false,
            "hide_top_toolbar": false,
            "save_image": false,
            "container_id": self.container_id(),
        })
    }

    /// Code HTML complet à intégrer dans une page
    pub fn embed_html(&self) -> String {
        let config = serde_json::to_string_pretty(&self.config_json())
            .unwrap_or_else(|_| "{}".to_string());

        format!(
            r#"<div class="tradingview-widget-container" style="height:{frame}px">
  <div id="{id}"></div>
  <script type="text/javascript" src="{script}"></script>
  <script type="text/javascript">
  new TradingView.widget({config});
  </script>
</div>
"#,
            frame = self.frame_height(),
            id = self.container_id(),
            script = TV_SCRIPT_URL,
            config = config,
        )
    }

    /// Lien vers le graphique TradingView complet
    pub fn chart_url(&self) -> String {
        format!("{}{}", TV_CHART_URL, self.symbol)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_id_replaces_colon() {
        let widget = TradingViewWidget::for_symbol("OANDA:XAUUSD");
        assert_eq!(widget.container_id(), "tradingview_OANDA_XAUUSD");
    }

    #[test]
    fn test_config_json_defaults() {
        let config = TradingViewWidget::for_symbol("BITSTAMP:BTCUSD").config_json();
        assert_eq!(config["symbol"], "BITSTAMP:BTCUSD");
        assert_eq!(config["height"], 520);
        assert_eq!(config["interval"], "60");
        assert_eq!(config["theme"], "dark");
        assert_eq!(config["enable_publishing"], false);
        assert_eq!(config["container_id"], "tradingview_BITSTAMP_BTCUSD");
    }

    #[test]
    fn test_embed_html() {
        let html = TradingViewWidget::for_symbol("NYSEARCA:SPY").embed_html();
        assert!(html.contains(r#"<div id="tradingview_NYSEARCA_SPY"></div>"#));
        assert!(html.contains("https://s3.tradingview.com/tv.js"));
        assert!(html.contains("new TradingView.widget("));
        assert!(html.contains("height:560px"));
    }

    #[test]
    fn test_chart_url() {
        let widget = TradingViewWidget::for_symbol("OANDA:EURUSD");
        assert_eq!(
            widget.chart_url(),
            "https://www.tradingview.com/chart/?symbol=OANDA:EURUSD"
        );
    }
}
