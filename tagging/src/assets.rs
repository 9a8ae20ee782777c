//! Built-in vocabularies for a Tyne and Wear Metro photo library.
//!
//! The context vocabulary describes the item as a whole (what kind of media,
//! where, when, weather). The train vocabulary describes one pictured train.

use std::fs;
use std::path::Path;

use crate::vocabulary::{TagEntry, Vocabulary, VocabularyError};

/// === Seeded vocabulary files ===
pub const CONTEXT_VOCABULARY_NAME: &str = "context.toml";
pub const TRAIN_VOCABULARY_NAME: &str = "train.toml";

pub const METRO_STATION_CODES: &[(&str, &str)] = &[
    ("APT", "Airport"),
    ("BDE", "Bede"),
    ("BFT", "Bank Foot"),
    ("BTN", "Benton"),
    ("BYK", "Byker"),
    ("BYW", "Brockley Whins"),
    ("CAL", "Callerton Parkway"),
    ("CEN", "Central Station"),
    ("CHI", "Chichester"),
    ("CRD", "Chillingham Road"),
    ("CUL", "Cullercoats"),
    ("EBO", "East Boldon"),
    ("FAW", "Fawdon"),
    ("FEL", "Felling"),
    ("FGT", "Fellgate"),
    ("FLE", "Four Lane Ends"),
    ("GHD", "Gateshead"),
    ("GST", "Gateshead Stadium"),
    ("HAY", "Haymarket"),
    ("HDR", "Hadrian Road"),
    ("HEB", "Hebburn"),
    ("HOW", "Howdon"),
    ("HTH", "Heworth"),
    ("ILF", "Ilford Road"),
    ("JAR", "Jarrow"),
    ("JES", "Jesmond"),
    ("KSP", "Kingston Park"),
    ("LBN", "Longbenton"),
    ("MAN", "Manors"),
    ("MLF", "Millfield"),
    ("MSN", "Monkseaton"),
    ("MSP", "St Peter's"),
    ("MMT", "Monument"),
    ("MTS", "Monument N-S"),
    ("MTW", "Monument W-E"),
    ("MWL", "Meadow Well"),
    ("NPK", "Northumberland Park"),
    ("NSH", "North Shields"),
    ("PAL", "Pallion"),
    ("PCM", "Percy Main"),
    ("PLI", "Park Lane"),
    ("PLW", "Pelaw"),
    ("PMV", "Palmersville"),
    ("RGC", "Regent Centre"),
    ("SBN", "Seaburn"),
    ("SFC", "Stadium of Light"),
    ("SGF", "South Gosforth"),
    ("SHL", "South Hylton"),
    ("SJM", "St James"),
    ("SMD", "Simonside"),
    ("SMR", "Shiremoor"),
    ("SSS", "South Shields"),
    ("SUN", "Sunderland"),
    ("TDK", "Tyne Dock"),
    ("TYN", "Tynemouth"),
    ("UNI", "University"),
    ("WBR", "Wansbeck Road"),
    ("WJS", "West Jesmond"),
    ("WKG", "Walkergate"),
    ("WMN", "West Monkseaton"),
    ("WSD", "Wallsend"),
    ("WTL", "Whitley Bay"),
];

fn tag(name: &str) -> TagEntry {
    TagEntry::new(name)
}

/// Tags for the item as a whole.
pub fn context_vocabulary() -> Vocabulary {
    let mut entries = vec![
        // type
        tag("photo/video").emoji("📷"),
        tag("screenshot").emoji("📱"),
        tag("pop app screenshot").implying(["screenshot"]),
        tag("thumbnail"),
        tag("video asset"),
        // focus
        tag("train focus").emoji("🚂"),
        tag("station focus").emoji("🚉"),
        tag("destination board focus"),
        tag("advert focus"),
        // location
        tag("metro station").emoji("🚉"),
    ];
    entries.extend(METRO_STATION_CODES.iter().map(|(code, name)| {
        tag(code)
            .display(format!("{name} metro station"))
            .implying(["metro station"])
    }));
    entries.extend([
        // time
        tag("daytime").emoji("🌅"),
        tag("nighttime").emoji("🌙"),
        // weather
        tag("sunny").emoji("☀️"),
        tag("cloudy").emoji("☁️"),
        tag("rain").emoji("🌧️"),
        tag("snow").emoji("❄️"),
        tag("fog").emoji("🌫️"),
        // activity
        tag("talking").emoji("🗣️"),
        // angle
        tag("normal angle"),
        tag("low angle"),
        tag("dutch angle"),
        tag("zoomed in"),
    ]);
    Vocabulary::from_entries(entries)
}

/// Tags for one pictured train.
pub fn train_vocabulary() -> Vocabulary {
    let mut entries = vec![
        tag("metro").color("#FBB914").emoji("🚇"),
        tag("class 555").implying(["metro"]),
    ];
    entries.extend((1..=46).map(|n| tag(&format!("555{n:03}")).implying(["class 555"])));
    entries.push(tag("class 599").implying(["metro"]));
    entries.push(tag("female announcements 599").implying(["class 599"]));
    entries.extend((1..=90).map(|n| {
        let unit = format!("4{n:03}");
        match n {
            20 => tag(&unit).display("jubilee 4020").implying(["class 599"]),
            73 | 81 => tag(&unit)
                .display(format!("female announcements {unit}"))
                .implying(["female announcements 599"]),
            _ => tag(&unit).implying(["class 599"]),
        }
    }));
    entries.extend([
        tag("RHTT").emoji("🚇"),
        tag("battery loco").emoji("🚇"),
    ]);
    entries.extend((0..3).map(|n| tag(&format!("BL{n}")).implying(["battery loco"])));
    entries.extend([
        tag("national rail").color("#7a68ae").emoji("🚆"),
        tag("northern rail")
            .implying(["national rail"])
            .color("#1c2e61"),
        // position
        tag("interior").implying(["foreground"]),
        tag("exterior"),
        tag("foreground"),
        tag("background"),
        tag("cab").implying(["interior"]),
        tag("middle"),
        tag("front"),
        tag("rear"),
        tag("from above").implying(["exterior"]),
        tag("face-on").implying(["exterior"]),
        tag("side-on").implying(["exterior"]),
        tag("platform"),
    ]);
    entries.extend((1..=4).map(|n| tag(&format!("platform {n}")).implying(["platform"])));
    entries.extend([
        tag("depot"),
        tag("shed").implying(["depot"]),
        tag("between stations"),
        tag("level crossing").implying(["between stations"]),
        // activity
        tag("arriving"),
        tag("stopped"),
        tag("terminated").implying(["stopped"]),
        tag("departing"),
        tag("not in service"),
        tag("not stopping").implying(["not in service", "arriving", "departing"]),
        tag("testing").implying(["not in service"]),
        tag("door tests").implying(["testing"]),
        tag("driver training"),
        // services
        tag("passenger service"),
        tag("yellow line service")
            .implying(["passenger service"])
            .emoji("🟡"),
    ]);
    entries.extend((121..=135).map(|n| tag(&format!("T{n}")).implying(["yellow line service"])));
    entries.push(
        tag("green line service")
            .implying(["passenger service"])
            .emoji("🟢"),
    );
    entries.extend((101..=112).map(|n| tag(&format!("T{n}")).implying(["green line service"])));
    entries.push(tag("additional service").implying(["passenger service"]));
    entries.extend((140..=198).map(|n| tag(&format!("T{n}")).implying(["additional service"])));
    entries.extend(
        METRO_STATION_CODES
            .iter()
            .map(|(code, name)| tag(&format!("dest:{code}")).display(format!("destination {name}"))),
    );
    entries.extend([
        // tones
        tag("tone").emoji("📢"),
        tag("low tone").implying(["tone"]),
        tag("high tone").implying(["tone"]),
        tag("low-high tone").implying(["low tone", "high tone"]),
        tag("doors out of use"),
    ]);
    Vocabulary::from_entries(entries)
}

/// Seed missing vocabulary files into `dir` (idempotent).
/// Returns the names of the files that were created.
pub fn write_default_vocabularies(dir: impl AsRef<Path>) -> Result<Vec<String>, VocabularyError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| VocabularyError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut created = Vec::new();
    for (name, vocab) in [
        (CONTEXT_VOCABULARY_NAME, context_vocabulary()),
        (TRAIN_VOCABULARY_NAME, train_vocabulary()),
    ] {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }
        fs::write(&path, vocab.to_toml_string()?)
            .map_err(|source| VocabularyError::Io { path, source })?;
        created.push(name.to_string());
    }
    Ok(created)
}
