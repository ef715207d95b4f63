//! Golden output tests: compile every sample, run each effect once and
//! compare its stdout byte for byte.
//!
//! Building needs a C++ compiler and an ESPHome checkout named by
//! `ELLEE_ESPHOME`; without them only the sample inventory is checked.

mod common;

use std::path::Path;
use std::time::Duration;

use ellee_compiler::validate::{self, Expectation, SetDiff};
use ellee_compiler::{pool, CompileOptions, Compiler, RenderConfig};

/// Upper bound for a single effect run.
const RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// 256 pixels of `255 * sinf(pi * i / 256)`.
const SINF: &[u8] =
    b"\r\
      000000 030303 060606 090909 0c0c0c 0f0f0f 121212 151515 181818 1c1c1c 1f1f1f 222222 \
      252525 282828 2b2b2b 2e2e2e 313131 343434 373737 3a3a3a 3d3d3d 404040 444444 474747 \
      4a4a4a 4d4d4d 4f4f4f 525252 555555 585858 5b5b5b 5e5e5e 616161 646464 676767 6a6a6a \
      6d6d6d 6f6f6f 727272 757575 787878 7a7a7a 7d7d7d 808080 838383 858585 888888 8b8b8b \
      8d8d8d 909090 929292 959595 979797 9a9a9a 9c9c9c 9f9f9f a1a1a1 a4a4a4 a6a6a6 a8a8a8 \
      ababab adadad afafaf b2b2b2 b4b4b4 b6b6b6 b8b8b8 bababa bcbcbc bfbfbf c1c1c1 c3c3c3 \
      c5c5c5 c7c7c7 c9c9c9 cacaca cccccc cecece d0d0d0 d2d2d2 d4d4d4 d5d5d5 d7d7d7 d9d9d9 \
      dadada dcdcdc dddddd dfdfdf e0e0e0 e2e2e2 e3e3e3 e5e5e5 e6e6e6 e7e7e7 e9e9e9 eaeaea \
      ebebeb ececec ededed efefef f0f0f0 f1f1f1 f2f2f2 f3f3f3 f4f4f4 f4f4f4 f5f5f5 f6f6f6 \
      f7f7f7 f8f8f8 f8f8f8 f9f9f9 fafafa fafafa fbfbfb fbfbfb fcfcfc fcfcfc fdfdfd fdfdfd \
      fdfdfd fefefe fefefe fefefe fefefe fefefe fefefe fefefe ffffff fefefe fefefe fefefe \
      fefefe fefefe fefefe fefefe fdfdfd fdfdfd fdfdfd fcfcfc fcfcfc fbfbfb fbfbfb fafafa \
      fafafa f9f9f9 f8f8f8 f8f8f8 f7f7f7 f6f6f6 f5f5f5 f4f4f4 f4f4f4 f3f3f3 f2f2f2 f1f1f1 \
      f0f0f0 efefef ededed ececec ebebeb eaeaea e9e9e9 e7e7e7 e6e6e6 e5e5e5 e3e3e3 e2e2e2 \
      e0e0e0 dfdfdf dddddd dcdcdc dadada d9d9d9 d7d7d7 d5d5d5 d4d4d4 d2d2d2 d0d0d0 cecece \
      cccccc cacaca c9c9c9 c7c7c7 c5c5c5 c3c3c3 c1c1c1 bfbfbf bcbcbc bababa b8b8b8 b6b6b6 \
      b4b4b4 b2b2b2 afafaf adadad ababab a8a8a8 a6a6a6 a4a4a4 a1a1a1 9f9f9f 9c9c9c 9a9a9a \
      979797 959595 929292 909090 8d8d8d 8b8b8b 888888 858585 838383 808080 7d7d7d 7a7a7a \
      787878 757575 727272 6f6f6f 6d6d6d 6a6a6a 676767 646464 616161 5e5e5e 5b5b5b 585858 \
      555555 525252 4f4f4f 4d4d4d 4a4a4a 474747 444444 404040 3d3d3d 3a3a3a 373737 343434 \
      313131 2e2e2e 2b2b2b 282828 252525 222222 1f1f1f 1c1c1c 181818 151515 121212 0f0f0f \
      0c0c0c 090909 060606 030303\
      \n";

/// 27 pixels, all still lit with time frozen at 42ms.
const COUNT_DOWN: &[u8] = b"\r00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 \
    00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 \
    00ff00 00ff00 00ff00 00ff00 00ff00 00ff00 00ff00\n";

type Sample = (&'static str, &'static [(&'static str, Expectation<'static>)]);

const EXPECTATIONS: &[Sample] = &[
    (
        "printf_then_exit.yaml",
        &[("unnamed", Expectation::Output(b"127\n"))],
    ),
    ("sin.yaml", &[("sinf", Expectation::Output(SINF))]),
    ("sparkle.yaml", &[("sparkle", Expectation::NonDeterministic)]),
    (
        "timer.yaml",
        &[("30s_count_down", Expectation::Output(COUNT_DOWN))],
    ),
];

#[test]
fn test_every_sample_has_expectations() {
    let want = EXPECTATIONS
        .iter()
        .map(|(sample, _)| sample.to_string())
        .collect();
    let got = validate::list_artifacts(&common::samples_dir())
        .expect("samples directory")
        .into_iter()
        .filter(|name| name.ends_with(".yaml"))
        .collect();
    let diff = SetDiff::between(&want, &got);
    assert!(
        diff.is_empty(),
        "{}",
        diff.describe("New samples without expectations", "Expectations without sample")
    );
}

#[test]
fn test_golden_outputs() {
    let Some(esphome) = common::esphome_checkout() else {
        eprintln!("skipping golden outputs: set ELLEE_ESPHOME to an ESPHome checkout and install g++");
        return;
    };

    let results = pool::fan_out(
        EXPECTATIONS.len(),
        EXPECTATIONS.to_vec(),
        |(sample, effects)| validate_sample(&esphome, sample, effects),
    );
    let failures: Vec<String> = results.into_iter().filter_map(Result::err).collect();

    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}

/// Build one sample into its own temporary directory, check the produced
/// artifacts, then run every deterministic effect. The directory is removed
/// when this returns, whatever the outcome.
fn validate_sample(
    esphome: &Path,
    sample: &str,
    effects: &[(&str, Expectation<'_>)],
) -> Result<(), String> {
    let tmp = tempfile::Builder::new()
        .prefix("ellee")
        .tempdir()
        .map_err(|e| format!("{}: {}", sample, e))?;

    let render = RenderConfig {
        as_hex: true,
        once: true,
        ..RenderConfig::default()
    };
    let options = CompileOptions::new(common::samples_dir().join(sample), esphome)
        .output_dir(tmp.path())
        .render(render);
    let output = Compiler::new(options)
        .compile()
        .map_err(|e| format!("{}: {}", sample, e))?;
    for build in output.builds() {
        if let Some(diagnostic) = &build.diagnostic {
            return Err(format!("{}/{}: {}", sample, build.effect_name, diagnostic));
        }
    }

    let want = validate::expected_artifacts(effects.iter().map(|(name, _)| *name));
    let got = validate::list_artifacts(tmp.path()).map_err(|e| e.to_string())?;
    let diff = SetDiff::between(&want, &got);
    if !diff.is_empty() {
        return Err(format!(
            "Unexpected effects found in {}\n{}",
            sample,
            diff.describe("New effect without expectations", "Expectations without effect")
        ));
    }

    for (name, expectation) in effects {
        if *expectation == Expectation::NonDeterministic {
            continue;
        }
        let stdout = validate::run_artifact(&tmp.path().join(name), Some(RUN_TIMEOUT))
            .map_err(|e| format!("{}/{}: {}", sample, name, e))?;
        validate::check_output(*expectation, &stdout)
            .map_err(|mismatch| format!("{}/{}:\n{}", sample, name, mismatch))?;
    }
    Ok(())
}
