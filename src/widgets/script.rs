//! Browser script for the interactive widgets

use super::active_toc::ROOT_MARGIN;
use super::tooltip::HIDE_DELAY;

pub const SCRIPT_FILE: &str = "folio.js";

/// localStorage key holding the theme preference
pub const THEME_STORAGE_KEY: &str = "theme";

const TEMPLATE: &str = r#"(function () {
  "use strict";

  var ROOT_MARGIN = "__ROOT_MARGIN__";
  var HIDE_DELAY_MS = __HIDE_DELAY_MS__;
  var THEME_KEY = "__THEME_KEY__";
  var DEFAULT_THEME = "__DEFAULT_THEME__";

  function prefersDark() {
    return window.matchMedia("(prefers-color-scheme: dark)").matches;
  }

  function storedTheme() {
    try {
      return localStorage.getItem(THEME_KEY) || DEFAULT_THEME;
    } catch (e) {
      return DEFAULT_THEME;
    }
  }

  function resolveTheme(theme) {
    if (theme === "system") return prefersDark() ? "dark" : "light";
    return theme;
  }

  function applyTheme() {
    var resolved = resolveTheme(storedTheme());
    document.documentElement.classList.toggle("dark", resolved === "dark");
    document.documentElement.dataset.theme = resolved;
  }

  function toggleTheme() {
    var next = resolveTheme(storedTheme()) === "dark" ? "light" : "dark";
    try {
      localStorage.setItem(THEME_KEY, next);
    } catch (e) {}
    if (document.startViewTransition) {
      document.startViewTransition(applyTheme);
    } else {
      applyTheme();
    }
  }

  function trackHeadings() {
    var links = document.querySelectorAll("[data-toc-link]");
    if (!links.length || !window.IntersectionObserver) return;

    var byId = {};
    links.forEach(function (link) {
      byId[link.getAttribute("data-toc-link")] = link;
    });

    var observer = new IntersectionObserver(function (entries) {
      entries.forEach(function (entry) {
        if (!entry.isIntersecting) return;
        var id = entry.target.id;
        if (!byId[id]) return;
        links.forEach(function (link) {
          link.classList.toggle("active", link === byId[id]);
        });
      });
    }, { rootMargin: ROOT_MARGIN });

    Object.keys(byId).forEach(function (id) {
      var heading = document.getElementById(id);
      if (heading) observer.observe(heading);
    });
  }

  function tooltips() {
    document.querySelectorAll("[data-tooltip]").forEach(function (trigger) {
      var tip = null;
      var timer = null;

      function show() {
        if (timer) {
          clearTimeout(timer);
          timer = null;
        }
        if (!tip) {
          tip = document.createElement("div");
          tip.className = "tooltip";
          tip.textContent = trigger.getAttribute("data-tooltip");
          tip.addEventListener("mouseenter", show);
          tip.addEventListener("mouseleave", hide);
          document.body.appendChild(tip);
        }
      }

      function hide() {
        if (timer) clearTimeout(timer);
        timer = setTimeout(function () {
          timer = null;
          if (tip) {
            tip.remove();
            tip = null;
          }
        }, HIDE_DELAY_MS);
      }

      trigger.addEventListener("mouseenter", show);
      trigger.addEventListener("mouseleave", hide);
    });
  }

  function tabs() {
    var items = document.querySelectorAll("[data-nav-item]");
    if (!items.length) return;
    var path = window.location.pathname.replace(/\/$/, "") || "/";
    var active = Array.prototype.find.call(items, function (item) {
      return item.getAttribute("href") === path;
    }) || items[0];

    function select(item) {
      items.forEach(function (other) {
        other.classList.toggle("active", other === item);
      });
    }

    select(active);
    items.forEach(function (item) {
      item.addEventListener("click", function () {
        select(item);
      });
    });
  }

  applyTheme();
  document.addEventListener("DOMContentLoaded", function () {
    document.querySelectorAll("[data-theme-switch]").forEach(function (button) {
      button.addEventListener("click", toggleTheme);
    });
    trackHeadings();
    tooltips();
    tabs();
  });
})();
"#;

/// Render `folio.js` with the given default theme preference
pub fn render(default_theme: &str) -> String {
    TEMPLATE
        .replace("__ROOT_MARGIN__", &ROOT_MARGIN.to_css())
        .replace("__HIDE_DELAY_MS__", &HIDE_DELAY.as_millis().to_string())
        .replace("__THEME_KEY__", THEME_STORAGE_KEY)
        .replace("__DEFAULT_THEME__", default_theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_inlined() {
        let js = render("system");
        assert!(js.contains(r#"var ROOT_MARGIN = "-20% 0% -35% 0px";"#));
        assert!(js.contains("var HIDE_DELAY_MS = 150;"));
        assert!(js.contains(r#"var DEFAULT_THEME = "system";"#));
        assert!(!js.contains("__"));
    }
}
