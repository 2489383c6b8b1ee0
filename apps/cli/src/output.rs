//! Catalog printing.

use serde::Serialize;
use switchres_display::{DisplayId, DisplayMode, ModeCatalog};

#[derive(Debug, Serialize)]
struct CatalogJson<'a> {
    display: DisplayId,
    current: &'a DisplayMode,
    modes: Vec<&'a DisplayMode>,
}

/// Catalog as pretty JSON, modes ascending by width.
pub fn catalog_json(catalog: &ModeCatalog) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&CatalogJson {
        display: catalog.display(),
        current: catalog.current(),
        modes: catalog.sorted_by_width(),
    })
}

pub fn print_catalog(catalog: &ModeCatalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", catalog_json(catalog)?);
    } else {
        print!("{}", catalog.listing());
    }
    Ok(())
}

/// Shown when the requested resolution is not in the catalog.
pub fn print_not_found(catalog: &ModeCatalog) {
    eprintln!("Requested screen resolution not found. Available modes:");
    eprint!("{}", catalog.listing());
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchres_display::ModeId;

    #[test]
    fn test_catalog_json_shape() {
        let current = DisplayMode::new(ModeId(2), 1920, 1080).with_refresh_millihertz(60_000);
        let catalog = ModeCatalog::from_modes(
            DisplayId(7),
            current.clone(),
            vec![
                current,
                DisplayMode::new(ModeId(1), 1280, 720).with_pixels(2560, 1440),
            ],
        );

        let value: serde_json::Value = serde_json::from_str(&catalog_json(&catalog).unwrap()).unwrap();

        assert_eq!(value["display"], 7);
        assert_eq!(value["current"]["width"], 1920);
        assert_eq!(value["current"]["refresh_millihertz"], 60_000);
        assert_eq!(value["modes"][0]["width"], 1280);
        assert_eq!(value["modes"][0]["pixel_width"], 2560);
        assert_eq!(value["modes"][1]["id"], 2);
    }
}
