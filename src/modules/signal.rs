// In-page probe reports - no Tauri imports allowed.
// The content webview cannot call back into the shell directly (remote
// pages get no IPC), so the injected probe reports by navigating to an
// internal scheme. The glue intercepts those navigations, cancels them,
// and parses the payload here.

use url::Url;

/// Scheme used by the injected probe. Navigations to it never reach the
/// network; the glue cancels them in its navigation handler.
pub const SIGNAL_SCHEME: &str = "chatdock";

/// History availability as observed inside the page after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityReport {
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// Parse `chatdock://availability?back=1&fwd=0` style report URLs.
/// Returns `None` for anything that is not a probe signal.
pub fn parse_availability_signal(url: &Url) -> Option<AvailabilityReport> {
    if url.scheme() != SIGNAL_SCHEME || url.host_str() != Some("availability") {
        return None;
    }

    let mut report = AvailabilityReport {
        can_go_back: false,
        can_go_forward: false,
    };
    for (key, value) in url.query_pairs() {
        let on = value == "1" || value == "true";
        match key.as_ref() {
            "back" => report.can_go_back = on,
            "fwd" => report.can_go_forward = on,
            _ => {}
        }
    }
    Some(report)
}

/// Injected into every content page. Reports history availability once the
/// page has loaded, preferring the Navigation API where the platform has
/// it and falling back to a history-length heuristic.
pub const PROBE_SCRIPT: &str = r#"
(function () {
  if (window.__chatdockProbe) { return; }
  window.__chatdockProbe = true;
  function report() {
    var back = false, fwd = false;
    if (window.navigation && typeof navigation.canGoBack === 'boolean') {
      back = navigation.canGoBack;
      fwd = navigation.canGoForward;
    } else {
      back = window.history.length > 1;
    }
    try {
      window.location.replace(
        'chatdock://availability?back=' + (back ? 1 : 0) + '&fwd=' + (fwd ? 1 : 0)
      );
    } catch (e) { /* cancelled by the shell, expected */ }
  }
  if (document.readyState === 'complete') {
    report();
  } else {
    window.addEventListener('load', report);
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("chatdock://availability?back=1&fwd=0", true, false)]
    #[case("chatdock://availability?back=0&fwd=1", false, true)]
    #[case("chatdock://availability?back=true&fwd=true", true, true)]
    #[case("chatdock://availability", false, false)]
    fn parses_availability_reports(
        #[case] url: &str,
        #[case] back: bool,
        #[case] forward: bool,
    ) {
        let report = parse_availability_signal(&Url::parse(url).unwrap()).unwrap();
        assert_eq!(report.can_go_back, back);
        assert_eq!(report.can_go_forward, forward);
    }

    #[rstest]
    #[case("https://example.com/?back=1")]
    #[case("chatdock://something-else?back=1")]
    #[case("about:blank")]
    fn ignores_non_signals(#[case] url: &str) {
        assert_eq!(parse_availability_signal(&Url::parse(url).unwrap()), None);
    }
}
