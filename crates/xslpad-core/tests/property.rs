use std::panic;

use xslpad_core::{
    PARAM_END, PARAM_START, ParameterEntry, diagnostics, extract_global_names, inject, reconcile,
    set_version, strip,
};

const CASES: usize = 300;
const MAX_PIECES: usize = 40;
const MAX_LEN: usize = 256;

const ROOT: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">"#;

const PIECES: &[&str] = &[
    "\n",
    "\r\n",
    "  ",
    "\t",
    "text",
    "<out/>",
    "<!-- note -->",
    "<xsl:param name=\"a\"/>",
    "<xsl:param name=\"b\" select=\"1\"/>",
    "<xsl:param name=\"c\">",
    "</xsl:param>",
    "<xsl:param/>",
    "<xsl:template match=\"/\">",
    "<xsl:template name=\"t\">",
    "</xsl:template>",
    "<xsl:function name=\"f:g\">",
    "</xsl:function>",
    "<xsl:variable name=\"v\">",
    "</xsl:variable>",
    "<xsl:param name=\"local\"/>",
    PARAM_START,
    PARAM_END,
];

const NAMES: &[&str] = &["a", "b", "fresh", ""];

const CHARSET: &[char] = &[
    '<', '>', '/', '=', '"', '\'', ' ', '\n', '\r', '\t', '!', '-', '?', '[', ']', ':', 'x', 's',
    'l', 'p', 'a', 'r', 'm', 'n', 'e', 'E', 'W', 'é', '→',
];

#[test]
fn strip_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x5d1e_77a0_93c4_1f2b);
    for case in 0..CASES {
        let source = random_stylesheet(&mut rng);
        let once = strip(&source);
        let twice = strip(&once);
        if once != twice {
            return Err(format!("strip not idempotent for case {}:\n{}", case, source).into());
        }
    }
    Ok(())
}

#[test]
fn inject_round_trips_clean_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x0c3a_9e41_d72b_66f8);
    for case in 0..CASES {
        let clean = strip(&random_stylesheet(&mut rng));
        let params = random_params(&mut rng);
        let injected = inject(&clean, &params);
        if strip(&injected) != clean {
            return Err(format!(
                "round trip failed for case {}:\n---\n{}\n---\n{}",
                case, clean, injected
            )
            .into());
        }
        if inject(&injected, &params) != injected {
            return Err(format!("inject not idempotent for case {}:\n{}", case, clean).into());
        }
    }
    Ok(())
}

#[test]
fn injected_names_are_extracted() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x7744_1b0e_2fa9_c315);
    for case in 0..CASES {
        let params = random_params(&mut rng);
        let injected = inject(&random_stylesheet(&mut rng), &params);
        let names = extract_global_names(&injected);
        for entry in params.iter().filter(|entry| entry.is_named()) {
            if !names.contains(&entry.name) {
                return Err(format!(
                    "{:?} missing after inject for case {}:\n{}",
                    entry.name, case, injected
                )
                .into());
            }
        }
        if names.contains("local") {
            return Err(format!("scoped name surfaced for case {}:\n{}", case, injected).into());
        }
    }
    Ok(())
}

#[test]
fn engine_never_panics_on_random_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = Lcg::new(0x91d4_2f8e_c1a3_044f);
    for case in 0..CASES {
        let len = rng.gen_range(0, MAX_LEN + 1);
        let source: String = (0..len)
            .map(|_| CHARSET[rng.gen_range(0, CHARSET.len())])
            .collect();
        let params = random_params(&mut rng);
        let result = panic::catch_unwind(|| {
            let injected = inject(&source, &params);
            let _ = strip(&injected);
            let _ = reconcile(&source, &params);
            let _ = set_version(&source, "2.0");
            let _ = diagnostics(&source);
        });
        if result.is_err() {
            return Err(format!("engine panicked for case {}: {:?}", case, source).into());
        }
    }
    Ok(())
}

fn random_stylesheet(rng: &mut Lcg) -> String {
    let count = rng.gen_range(0, MAX_PIECES + 1);
    let mut out = String::from(ROOT);
    for _ in 0..count {
        out.push_str(PIECES[rng.gen_range(0, PIECES.len())]);
    }
    out.push_str("</xsl:stylesheet>");
    out
}

fn random_params(rng: &mut Lcg) -> Vec<ParameterEntry> {
    let count = rng.gen_range(0, 4);
    (0..count)
        .map(|_| ParameterEntry::new(NAMES[rng.gen_range(0, NAMES.len())], ""))
        .collect()
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    fn gen_range(&mut self, start: usize, end: usize) -> usize {
        if end <= start {
            return start;
        }
        start + (self.next_u32() as usize % (end - start))
    }
}
