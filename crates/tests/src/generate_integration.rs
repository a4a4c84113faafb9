//! Integration tests for a full generation run
//!
//! These drive the orchestrator end to end with canned `aplay` output and
//! check both the negotiated parameters and what ends up on disk.

use combo4_core::domain::{
    AppConfig, ComboError, DeviceInspector, DeviceRecord, FixedSelection, Generator, Result,
    ScriptedInspector, ValueDomain,
};
use combo4_infra::AplayInspector;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const LISTING: &str = "\
**** List of PLAYBACK Hardware Devices ****
card 0: PCH [HDA Intel PCH], device 0: ALC892 Analog [ALC892 Analog]
  Subdevices: 1/1
  Subdevice #0: subdevice #0
card 3: A [USB-C to 3.5mm Headphone Jack A], device 0: USB Audio [USB Audio]
  Subdevices: 1/1
  Subdevice #0: subdevice #0
card 4: CODEC [USB Audio CODEC], device 0: USB Audio [USB Audio]
  Subdevices: 0/1
  Subdevice #0: subdevice #0
";

fn dump(card: &str, formats: &str, rate: &str) -> String {
    format!(
        "Playing raw data '/dev/zero' : Unsigned 8 bit, Rate 8000 Hz, Mono\n\
         HW Params of device \"hw:CARD={card},DEV=0\":\n\
         --------------------\n\
         ACCESS:  MMAP_INTERLEAVED RW_INTERLEAVED\n\
         FORMAT:  {formats}\n\
         SUBFORMAT:  STD\n\
         CHANNELS: 2\n\
         RATE: {rate}\n\
         --------------------\n\
         aplay: set_params:1343: Sample format non available\n"
    )
}

fn config_in(dir: &TempDir) -> AppConfig {
    AppConfig {
        output_path: dir.path().join("asound.conf.generated"),
        ..Default::default()
    }
}

// ============================================================================
// SUCCESSFUL RUNS
// ============================================================================

#[tokio::test]
async fn test_two_usb_cards_negotiate_48k_s16() {
    let dir = TempDir::new().unwrap();
    let inspector = ScriptedInspector::new(LISTING)
        .with_dump("A", dump("A", "S16_LE", "48000"))
        .with_dump("CODEC", dump("CODEC", "S16_LE S24_3LE", "[44100 48000]"));
    let generator = Generator::new(Arc::new(inspector), config_in(&dir));

    let report = generator
        .run(&FixedSelection { first: 3, second: 4 })
        .await
        .unwrap();

    assert_eq!(report.rate, 48000);
    assert_eq!(report.format, "S16_LE");
    assert_eq!(report.second.capabilities.rate, ValueDomain::Range { min: 44100, max: 48000 });

    let doc = std::fs::read_to_string(dir.path().join("asound.conf.generated")).unwrap();
    assert!(doc.contains("# Device A: card 3 (A)  -> hw:CARD=A,DEV=0"));
    assert!(doc.contains("# Device B: card 4 (CODEC)  -> hw:CARD=CODEC,DEV=0"));
    assert!(doc.contains("rate=48000"));
    assert!(doc.contains("format=S16_LE"));
    assert!(doc.contains("slaves.b.pcm \"hw:CARD=CODEC,DEV=0\";"));
}

#[tokio::test]
async fn test_selection_order_decides_device_a() {
    let dir = TempDir::new().unwrap();
    let inspector = ScriptedInspector::new(LISTING)
        .with_dump("A", dump("A", "S16_LE", "48000"))
        .with_dump("CODEC", dump("CODEC", "S16_LE", "48000"));
    let generator = Generator::new(Arc::new(inspector), config_in(&dir));

    let report = generator
        .run(&FixedSelection { first: 4, second: 3 })
        .await
        .unwrap();
    assert_eq!(report.first.device.short_name, "CODEC");

    let doc = std::fs::read_to_string(&report.output_path).unwrap();
    assert!(doc.contains("ctl.both {\n  type hw;\n  card CODEC;\n}"));
}

#[tokio::test]
async fn test_rerun_produces_identical_file() {
    let dir = TempDir::new().unwrap();
    let inspector = Arc::new(
        ScriptedInspector::new(LISTING)
            .with_dump("A", dump("A", "S24_3LE S32_LE", "[8000 192000]"))
            .with_dump("CODEC", dump("CODEC", "S32_LE S24_3LE", "[44100 96000]")),
    );
    let generator = Generator::new(inspector, config_in(&dir));
    let selection = FixedSelection { first: 3, second: 4 };

    let first = generator.run(&selection).await.unwrap();
    let first_doc = std::fs::read(&first.output_path).unwrap();
    let second = generator.run(&selection).await.unwrap();
    let second_doc = std::fs::read(&second.output_path).unwrap();

    assert_eq!(first.format, "S24_3LE");
    assert_eq!(first_doc, second_doc);
}

#[tokio::test]
async fn test_configured_names_and_output_path() {
    let dir = TempDir::new().unwrap();
    let inspector = ScriptedInspector::new(LISTING)
        .with_dump("A", dump("A", "S16_LE", "[8000 48000]"))
        .with_dump("CODEC", dump("CODEC", "S16_LE", "[8000 48000]"));
    let config = AppConfig {
        output_path: dir.path().join("out").join("quad.conf"),
        plug_pcm: "quad".to_string(),
        preferred_rates: vec![44100],
        ..Default::default()
    };
    let generator = Generator::new(Arc::new(inspector), config);

    let report = generator
        .run(&FixedSelection { first: 3, second: 4 })
        .await
        .unwrap();

    assert_eq!(report.rate, 44100);
    assert!(report.next_steps().contains(&"aplay -L | grep quad".to_string()));
    let doc = std::fs::read_to_string(dir.path().join("out").join("quad.conf")).unwrap();
    assert!(doc.contains("pcm.quad {"));
}

// ============================================================================
// FATAL PATHS
// ============================================================================

#[tokio::test]
async fn test_disjoint_rates_write_nothing() {
    let dir = TempDir::new().unwrap();
    let inspector = ScriptedInspector::new(LISTING)
        .with_dump("A", dump("A", "S16_LE", "[8000 16000]"))
        .with_dump("CODEC", dump("CODEC", "S16_LE", "[32000 96000]"));
    let generator = Generator::new(Arc::new(inspector), config_in(&dir));

    let err = generator
        .run(&FixedSelection { first: 3, second: 4 })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ComboError::NoCommonParameters { rate: None, format: Some(_) }
    ));
    assert!(!dir.path().join("asound.conf.generated").exists());
}

#[tokio::test]
async fn test_missing_aplay_is_insufficient_devices() {
    let dir = TempDir::new().unwrap();
    let inspector = AplayInspector::default().with_program("combo4-no-such-aplay");
    let generator = Generator::new(Arc::new(inspector), config_in(&dir));

    let err = generator
        .run(&FixedSelection { first: 3, second: 4 })
        .await
        .unwrap_err();

    assert!(matches!(err, ComboError::InsufficientDevices { found: 0 }));
    assert!(!dir.path().join("asound.conf.generated").exists());
}

/// Lists cards normally but fails every probe
struct BrokenProbe {
    probes: AtomicUsize,
}

#[async_trait::async_trait]
impl DeviceInspector for BrokenProbe {
    async fn list_devices(&self) -> Result<String> {
        Ok(LISTING.to_string())
    }

    async fn dump_hw_params(&self, device: &DeviceRecord) -> Result<String> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Err(ComboError::Inspection(format!("{} is busy", device.hw_address())))
    }
}

#[tokio::test]
async fn test_failed_probes_degrade_to_no_common_parameters() {
    let dir = TempDir::new().unwrap();
    let inspector = Arc::new(BrokenProbe {
        probes: AtomicUsize::new(0),
    });
    let generator = Generator::new(inspector.clone(), config_in(&dir));

    let err = generator
        .run(&FixedSelection { first: 0, second: 3 })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ComboError::NoCommonParameters { rate: None, format: None }
    ));
    assert_eq!(inspector.probes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_bad_selection_skips_probing() {
    let dir = TempDir::new().unwrap();
    let inspector = Arc::new(BrokenProbe {
        probes: AtomicUsize::new(0),
    });
    let generator = Generator::new(inspector.clone(), config_in(&dir));

    let err = generator
        .run(&FixedSelection { first: 3, second: 7 })
        .await
        .unwrap_err();

    assert!(matches!(err, ComboError::InvalidSelection(7)));
    assert_eq!(inspector.probes.load(Ordering::SeqCst), 0);
}
