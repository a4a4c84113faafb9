//! asound.conf rendering
//!
//! The document declares:
//! - `pcm.<combo>`: a `route` over a `multi` that binds logical channels 0-1
//!   to card A and 2-3 to card B, with an identity `ttable`
//! - `ctl.<combo>`: a `hw` control bound to card A
//! - `pcm.<plug>`: a `plug` pinning format, rate and 4 channels on top of
//!   the combo, which is what applications open

use crate::domain::device::DeviceRecord;
use std::fmt::Write;

/// Logical channel -> (slave, slave channel)
pub const CHANNEL_MAP: [(char, u32); 4] = [('a', 0), ('a', 1), ('b', 0), ('b', 1)];

/// PCM names used in the generated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub combo_pcm: String,
    pub plug_pcm: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            combo_pcm: "both".to_string(),
            plug_pcm: "convert4".to_string(),
        }
    }
}

/// Render with the default PCM names
pub fn render(a: &DeviceRecord, b: &DeviceRecord, rate: u32, format: &str) -> String {
    render_with(a, b, rate, format, &RenderOptions::default())
}

/// Render the combined device; output depends only on the arguments
pub fn render_with(
    a: &DeviceRecord,
    b: &DeviceRecord,
    rate: u32,
    format: &str,
    options: &RenderOptions,
) -> String {
    let combo = &options.combo_pcm;
    let plug = &options.plug_pcm;
    let rule = "# ============================================================";

    let mut out = String::new();

    // Header
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "# Auto-generated ALSA config: virtual 4ch device from two stereo devices"
    );
    let _ = writeln!(out, "#");
    let _ = writeln!(
        out,
        "# Device A: card {} ({})  -> {}",
        a.index,
        a.short_name,
        a.hw_address()
    );
    let _ = writeln!(
        out,
        "# Device B: card {} ({})  -> {}",
        b.index,
        b.short_name,
        b.hw_address()
    );
    let _ = writeln!(out, "#");
    let _ = writeln!(out, "# Mapping:");
    let _ = writeln!(out, "#   ch0-1 -> Device A (L/R)");
    let _ = writeln!(out, "#   ch2-3 -> Device B (L/R)");
    let _ = writeln!(out, "#");
    let _ = writeln!(out, "# User-facing device: \"{plug}\"");
    let _ = writeln!(
        out,
        "# Pinned common hw params: rate={rate}, format={format}, channels=4"
    );
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out);

    // Routing over the two stereo slaves
    let _ = writeln!(out, "pcm.{combo} {{");
    let _ = writeln!(out, "  type route;");
    let _ = writeln!(out, "  slave.pcm {{");
    let _ = writeln!(out, "    type multi;");
    let _ = writeln!(out);
    for (slave, card) in [('a', a), ('b', b)] {
        let _ = writeln!(out, "    slaves.{slave}.pcm \"{}\";", card.hw_address());
        let _ = writeln!(out, "    slaves.{slave}.channels 2;");
        let _ = writeln!(out);
    }
    for (logical, (slave, channel)) in CHANNEL_MAP.iter().enumerate() {
        let _ = writeln!(
            out,
            "    bindings.{logical}.slave {slave}; bindings.{logical}.channel {channel};"
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "    hint {{ description \"Combo HW ({}+{}) raw 4ch\" }}",
        a.short_name, b.short_name
    );
    let _ = writeln!(out, "  }}");
    let _ = writeln!(out);
    for logical in 0..CHANNEL_MAP.len() {
        let _ = writeln!(out, "  ttable.{logical}.{logical} 1;");
    }
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);

    // Control interface
    let _ = writeln!(out, "ctl.{combo} {{");
    let _ = writeln!(out, "  type hw;");
    let _ = writeln!(out, "  card {};", a.short_name);
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);

    // Pinned conversion wrapper
    let _ = writeln!(out, "pcm.{plug} {{");
    let _ = writeln!(out, "  type plug");
    let _ = writeln!(out, "  slave {{");
    let _ = writeln!(out, "    pcm {combo}");
    let _ = writeln!(out, "    format {format}");
    let _ = writeln!(out, "    channels 4");
    let _ = writeln!(out, "    rate {rate}");
    let _ = writeln!(out, "  }}");
    let _ = writeln!(
        out,
        "  hint {{ description \"Combo Converted 4ch {format} {rate}Hz\" }}"
    );
    let _ = writeln!(out, "}}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards() -> (DeviceRecord, DeviceRecord) {
        (
            DeviceRecord::new(3, "A", "USB-C to 3.5mm Headphone Jack A"),
            DeviceRecord::new(4, "CODEC", "USB Audio CODEC"),
        )
    }

    #[test]
    fn test_render_is_deterministic() {
        let (a, b) = cards();
        let first = render(&a, &b, 48000, "S16_LE");
        let second = render(&a, &b, 48000, "S16_LE");
        assert_eq!(first, second);
    }

    #[test]
    fn test_header() {
        let (a, b) = cards();
        let doc = render(&a, &b, 48000, "S16_LE");

        assert!(doc.contains("# Device A: card 3 (A)  -> hw:CARD=A,DEV=0"));
        assert!(doc.contains("# Device B: card 4 (CODEC)  -> hw:CARD=CODEC,DEV=0"));
        assert!(doc.contains("rate=48000"));
        assert!(doc.contains("format=S16_LE"));
        assert!(doc.contains("# User-facing device: \"convert4\""));
    }

    #[test]
    fn test_multi_bindings_and_ttable() {
        let (a, b) = cards();
        let doc = render(&a, &b.with_sub_index(1), 44100, "S24_3LE");

        assert!(doc.contains("slaves.a.pcm \"hw:CARD=A,DEV=0\";"));
        assert!(doc.contains("slaves.b.pcm \"hw:CARD=CODEC,DEV=1\";"));
        assert!(doc.contains("bindings.0.slave a; bindings.0.channel 0;"));
        assert!(doc.contains("bindings.1.slave a; bindings.1.channel 1;"));
        assert!(doc.contains("bindings.2.slave b; bindings.2.channel 0;"));
        assert!(doc.contains("bindings.3.slave b; bindings.3.channel 1;"));
        for i in 0..4 {
            assert!(doc.contains(&format!("ttable.{i}.{i} 1;")));
        }
        assert!(doc.contains("hint { description \"Combo HW (A+CODEC) raw 4ch\" }"));
    }

    #[test]
    fn test_plug_and_ctl() {
        let (a, b) = cards();
        let doc = render(&a, &b, 44100, "S24_3LE");

        assert!(doc.contains("ctl.both {\n  type hw;\n  card A;\n}"));
        assert!(doc.contains(
            "pcm.convert4 {\n  type plug\n  slave {\n    pcm both\n    format S24_3LE\n    channels 4\n    rate 44100\n  }"
        ));
        assert!(doc.contains("Combo Converted 4ch S24_3LE 44100Hz"));
    }

    #[test]
    fn test_custom_names() {
        let (a, b) = cards();
        let options = RenderOptions {
            combo_pcm: "quad_raw".to_string(),
            plug_pcm: "quad".to_string(),
        };
        let doc = render_with(&a, &b, 48000, "S16_LE", &options);

        assert!(doc.contains("pcm.quad_raw {"));
        assert!(doc.contains("ctl.quad_raw {"));
        assert!(doc.contains("pcm.quad {"));
        assert!(doc.contains("    pcm quad_raw\n"));
        assert!(!doc.contains("convert4"));
    }
}
