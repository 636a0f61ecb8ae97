//! 页面内辅助脚本
//!
//! 所有 DOM 交互都通过 `JsExecutor::eval` 执行这里拼出来的脚本。
//! `PRELUDE` 定义了 `__pe` 对象：按策略查找元素、判断可见性、取可访问名称。

use crate::locator::{Resolved, Strategy};

pub const PRELUDE: &str = r#"
const __pe = (() => {
    const norm = (t) => (t || '').replace(/\s+/g, ' ').trim();
    const lower = (t) => norm(t).toLowerCase();
    const visible = (el) => {
        if (!el || !el.isConnected) return false;
        const s = window.getComputedStyle(el);
        if (s.display === 'none' || s.visibility === 'hidden' || parseFloat(s.opacity) === 0) return false;
        const r = el.getBoundingClientRect();
        return r.width > 0 && r.height > 0;
    };
    const accessibleName = (el) => norm(
        el.getAttribute('aria-label') || el.innerText || el.textContent || el.value || el.getAttribute('title')
    );
    const IMPLICIT_ROLES = {
        button: 'button, input[type="button"], input[type="submit"], input[type="reset"]',
        link: 'a[href]',
        textbox: 'input:not([type]), input[type="text"], input[type="email"], input[type="password"], input[type="search"], input[type="tel"], textarea',
        combobox: 'select, mat-select, ng-select',
        checkbox: 'input[type="checkbox"]',
        radio: 'input[type="radio"]',
        option: 'option, mat-option',
        row: 'tr',
        cell: 'td',
        columnheader: 'th',
        table: 'table',
        dialog: 'dialog, mat-dialog-container',
        alert: '',
        tab: '',
        listbox: '',
        heading: 'h1, h2, h3, h4, h5, h6'
    };
    const innermost = (els) => els.filter((el) => !els.some((other) => other !== el && el.contains(other)));
    const byLabel = (text) => {
        const want = lower(text);
        const out = [];
        for (const label of document.querySelectorAll('label, mat-label')) {
            if (!lower(label.innerText || label.textContent).includes(want)) continue;
            const forId = label.getAttribute('for');
            let control = forId ? document.getElementById(forId) : null;
            if (!control) control = label.querySelector('input, textarea, select');
            if (!control) {
                const field = label.closest('mat-form-field, .form-group, .form-field, .mat-mdc-form-field, div');
                control = field ? field.querySelector('input, textarea, select, mat-select') : null;
            }
            if (control && !out.includes(control)) out.push(control);
        }
        for (const el of document.querySelectorAll('[aria-label]')) {
            if (lower(el.getAttribute('aria-label')).includes(want) && !out.includes(el)) out.push(el);
        }
        return out;
    };
    const all = (s) => {
        switch (s.kind) {
            case 'css':
                return Array.from(document.querySelectorAll(s.value));
            case 'xpath': {
                const snap = document.evaluate(s.value, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
                return out;
            }
            case 'text': {
                const want = lower(s.value);
                const pool = Array.from(document.querySelectorAll(s.scope || 'body *'));
                const hits = pool.filter((el) => {
                    const t = lower(el.innerText || el.textContent);
                    return s.exact ? t === want : t.includes(want);
                });
                return s.scope ? hits : innermost(hits);
            }
            case 'role': {
                const implicit = IMPLICIT_ROLES[s.role];
                const sel = `[role="${s.role}"]` + (implicit ? `, ${implicit}` : '');
                const els = Array.from(document.querySelectorAll(sel));
                if (!s.name) return els;
                const want = lower(s.name);
                return els.filter((el) => accessibleName(el).toLowerCase().includes(want));
            }
            case 'placeholder': {
                const want = lower(s.value);
                return Array.from(document.querySelectorAll('[placeholder]'))
                    .filter((el) => lower(el.getAttribute('placeholder')).includes(want));
            }
            case 'label':
                return byLabel(s.value);
            case 'test_id':
                return Array.from(document.querySelectorAll(
                    `[data-testid="${CSS.escape(s.value)}"], [data-test-id="${CSS.escape(s.value)}"], [data-test="${CSS.escape(s.value)}"]`
                ));
            default:
                return [];
        }
    };
    const textOf = (el) => norm(el.innerText || el.textContent || el.value);
    return { all, visible, norm, textOf, accessibleName };
})();
"#;

/// 统计某个策略的匹配数量与第一个可见匹配的下标
pub fn probe(strategy: &Strategy) -> String {
    format!(
        r#"(() => {{
            {prelude}
            const els = __pe.all({strategy});
            const idx = els.findIndex(__pe.visible);
            return {{ attached: els.length, visible_index: idx >= 0 ? idx : null }};
        }})()"#,
        prelude = PRELUDE,
        strategy = strategy.to_json(),
    )
}

/// 对已定位元素执行一段脚本，脚本体中可用 `el`
///
/// 元素已被移除时返回 `{ ok: false }`，否则返回 `{ ok: true, value }`。
pub fn on_element(target: &Resolved, body: &str) -> String {
    format!(
        r#"(() => {{
            {prelude}
            const el = __pe.all({strategy})[{index}];
            if (!el) return {{ ok: false }};
            const value = (() => {{ {body} }})();
            return {{ ok: true, value: value === undefined ? null : value }};
        }})()"#,
        prelude = PRELUDE,
        strategy = target.strategy.to_json(),
        index = target.index,
        body = body,
    )
}

pub const CLICK: &str = r#"
    el.scrollIntoView({ block: 'center', inline: 'center' });
    el.click();
    return true;
"#;

/// 兼容受控组件的输入：走原生 setter 再派发 input/change 事件
pub fn fill(value: &str) -> String {
    let value = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"
        el.scrollIntoView({{ block: 'center' }});
        el.focus();
        const v = {value};
        const proto = el instanceof HTMLTextAreaElement
            ? HTMLTextAreaElement.prototype
            : (el instanceof HTMLInputElement ? HTMLInputElement.prototype : null);
        const desc = proto ? Object.getOwnPropertyDescriptor(proto, 'value') : null;
        if (el instanceof HTMLSelectElement) {{
            const want = v.toLowerCase();
            const opt = Array.from(el.options)
                .find((o) => __pe.norm(o.text).toLowerCase() === want || o.value === v);
            el.value = opt ? opt.value : v;
        }} else if (desc && desc.set) {{
            desc.set.call(el, v);
        }} else if (el.isContentEditable) {{
            el.textContent = v;
        }} else {{
            el.value = v;
        }}
        el.dispatchEvent(new Event('input', {{ bubbles: true }}));
        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
        el.blur();
        return true;
        "#,
        value = value,
    )
}

pub fn press_key(key: &str) -> String {
    let key_json = serde_json::to_string(key).unwrap_or_else(|_| "\"Enter\"".to_string());
    format!(
        r#"
        el.focus();
        const key = {key_json};
        const code = key === 'Enter' ? 13 : (key === 'Escape' ? 27 : (key === 'Tab' ? 9 : 0));
        const init = {{ key, code: key, keyCode: code, which: code, bubbles: true, cancelable: true }};
        el.dispatchEvent(new KeyboardEvent('keydown', init));
        el.dispatchEvent(new KeyboardEvent('keypress', init));
        el.dispatchEvent(new KeyboardEvent('keyup', init));
        if (key === 'Enter' && el.form && typeof el.form.requestSubmit === 'function') {{
            el.form.requestSubmit();
        }}
        return true;
        "#,
        key_json = key_json,
    )
}

pub const TEXT: &str = "return __pe.textOf(el);";

pub const VALUE: &str = "return el.value === undefined ? __pe.textOf(el) : String(el.value);";

pub const ENABLED: &str = r#"
    return !(el.disabled || el.getAttribute('aria-disabled') === 'true' || el.classList.contains('disabled'));
"#;

pub fn attribute(name: &str) -> String {
    let name = serde_json::to_string(name).unwrap_or_else(|_| "\"\"".to_string());
    format!("return el.getAttribute({});", name)
}

pub fn child_count(css: &str) -> String {
    let css = serde_json::to_string(css).unwrap_or_else(|_| "\"*\"".to_string());
    format!("return el.querySelectorAll({}).length;", css)
}

pub fn container_class(container_css: &str) -> String {
    let css = serde_json::to_string(container_css).unwrap_or_else(|_| "\"*\"".to_string());
    format!(
        "const c = el.closest({}); return c ? c.getAttribute('class') : null;",
        css
    )
}

/// 所有可见匹配的文本
pub fn visible_texts(strategy: &Strategy) -> String {
    format!(
        r#"(() => {{
            {prelude}
            return __pe.all({strategy}).filter(__pe.visible).map(__pe.textOf);
        }})()"#,
        prelude = PRELUDE,
        strategy = strategy.to_json(),
    )
}

/// 可见行的单元格文本
pub fn table_rows(row: &Strategy, cell_css: &str) -> String {
    let cell_css = serde_json::to_string(cell_css).unwrap_or_else(|_| "\"td\"".to_string());
    format!(
        r#"(() => {{
            {prelude}
            return __pe.all({row}).filter(__pe.visible).map((r) =>
                Array.from(r.querySelectorAll({cell_css})).map(__pe.textOf));
        }})()"#,
        prelude = PRELUDE,
        row = row.to_json(),
        cell_css = cell_css,
    )
}

/// 把第 `index` 个匹配及其祖先强制设为可见
pub fn force_visible(strategy: &Strategy, index: usize) -> String {
    format!(
        r#"(() => {{
            {prelude}
            const el = __pe.all({strategy})[{index}];
            if (!el) return false;
            for (let node = el; node && node !== document.body; node = node.parentElement) {{
                const s = window.getComputedStyle(node);
                if (s.display === 'none') node.style.setProperty('display', 'block', 'important');
                if (s.visibility === 'hidden') node.style.setProperty('visibility', 'visible', 'important');
                if (parseFloat(s.opacity) === 0) node.style.setProperty('opacity', '1', 'important');
            }}
            return __pe.visible(el);
        }})()"#,
        prelude = PRELUDE,
        strategy = strategy.to_json(),
        index = index,
    )
}

/// 页面是否已稳定：文档加载完成、资源请求数不再增长、没有可见的加载指示
///
/// 资源计数来自 `PerformanceObserver`，不受资源计时缓冲区（默认 250 条）上限影响。
pub const SETTLED: &str = r#"(() => {
    if (!window.__peResourceObserver) {
        window.__peResourceTotal = performance.getEntriesByType('resource').length;
        window.__peResourceObserver = new PerformanceObserver((list) => {
            window.__peResourceTotal += list.getEntries().length;
        });
        window.__peResourceObserver.observe({ type: 'resource' });
    }
    const count = window.__peResourceTotal;
    const previous = window.__peResourceCount;
    window.__peResourceCount = count;
    const spinners = document.querySelectorAll(
        '.spinner, .loading, .loader, mat-spinner, mat-progress-bar, .mat-mdc-progress-spinner, [aria-busy="true"], .ngx-spinner-overlay'
    );
    const busy = Array.from(spinners).some((el) => {
        const r = el.getBoundingClientRect();
        const s = window.getComputedStyle(el);
        return r.width > 0 && r.height > 0 && s.display !== 'none' && s.visibility !== 'hidden';
    });
    return document.readyState === 'complete' && previous === count && !busy;
})()"#;
