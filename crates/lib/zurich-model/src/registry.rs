//! Static lookup tables consumed before calling a backend.

/// A named layer of the WFS geoportal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoLayer {
    pub id: &'static str,
    pub service: &'static str,
    pub type_name: &'static str,
    pub description: &'static str,
}

/// Geoportal layers, sorted by id.
pub const GEOPORTAL_LAYERS: &[GeoLayer] = &[
    GeoLayer {
        id: "familienberatung",
        service: "Treffpunkt_Familienberatung",
        type_name: "poi_familienberatung_view",
        description: "Familienberatungs-Treffpunkte",
    },
    GeoLayer {
        id: "klimadaten",
        service: "Klimadaten",
        type_name: "klimadaten_raster",
        description: "Klimadaten (Raster, Temperaturen, Hitzeinseln)",
    },
    GeoLayer {
        id: "kreisbuero",
        service: "Kreisbuero",
        type_name: "poi_kreisbuero_view",
        description: "Kreisbüros der Stadt Zürich",
    },
    GeoLayer {
        id: "lehrpfade",
        service: "Lehrpfade",
        type_name: "poi_lehrpfad_view",
        description: "Lehrpfade und Bildungswege",
    },
    GeoLayer {
        id: "sammelstelle",
        service: "Sammelstelle",
        type_name: "poi_sammelstelle_view",
        description: "Abfall-Sammelstellen",
    },
    GeoLayer {
        id: "schulanlagen",
        service: "Schulanlagen",
        type_name: "poi_kindergarten_view",
        description: "Schulstandorte (Kindergärten, Schulhäuser, Horte)",
    },
    GeoLayer {
        id: "schulkreise",
        service: "Schulkreise",
        type_name: "adm_schulkreise_a",
        description: "Schulkreis-Grenzen (Polygone)",
    },
    GeoLayer {
        id: "schulwege",
        service: "Schulweguebergaenge",
        type_name: "poi_schulweg_att",
        description: "Schulweg-Übergänge und Gefahrenstellen",
    },
    GeoLayer {
        id: "sozialzentrum",
        service: "Sozialzentrum",
        type_name: "poi_sozialzentrum_view",
        description: "Sozialzentren",
    },
    GeoLayer {
        id: "spielplaetze",
        service: "POI_oeffentliche_Spielplaetze",
        type_name: "poi_oeffentl_spielplatz_view",
        description: "Öffentliche Spielplätze",
    },
    GeoLayer {
        id: "sport",
        service: "Sport",
        type_name: "poi_sport_view",
        description: "Sportanlagen und -einrichtungen",
    },
    GeoLayer {
        id: "stadtkreise",
        service: "Stadtkreise",
        type_name: "adm_stadtkreise_a",
        description: "Stadtkreis-Grenzen (Polygone)",
    },
    GeoLayer {
        id: "stimmlokale",
        service: "Stimmlokale",
        type_name: "poi_stimmlokale_view",
        description: "Abstimmungs- und Wahllokale",
    },
    GeoLayer {
        id: "velopruefstrecken",
        service: "Velopruefstrecken",
        type_name: "poi_velopruefstrecke_view",
        description: "Veloprüfstrecken für Schulen",
    },
];

/// Looks up a geoportal layer by id.
#[must_use]
pub fn geo_layer(id: &str) -> Option<&'static GeoLayer> {
    GEOPORTAL_LAYERS.iter().find(|layer| layer.id == id)
}

/// Layer ids in listing order.
#[must_use]
pub fn geo_layer_ids() -> Vec<&'static str> {
    GEOPORTAL_LAYERS.iter().map(|layer| layer.id).collect()
}

/// Tourism category names and their numeric ids.
pub const TOURISM_CATEGORIES: &[(&str, u32)] = &[
    ("aktivitaeten", 99),
    ("events", 136),
    ("familien", 175),
    ("kultur", 145),
    ("museen", 152),
    ("nachtleben", 139),
    ("natur", 157),
    ("restaurants", 166),
    ("shopping", 130),
    ("sport", 159),
    ("touren", 189),
    ("uebernachten", 71),
];

/// Resolves a tourism category name, ignoring ASCII case.
#[must_use]
pub fn tourism_category(name: &str) -> Option<u32> {
    TOURISM_CATEGORIES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name.trim()))
        .map(|(_, id)| *id)
}

/// Thematic groups of the open data catalog.
pub const CATALOG_GROUPS: &[&str] = &[
    "arbeit-und-erwerb",
    "basiskarten",
    "bauen-und-wohnen",
    "bevolkerung",
    "bildung",
    "energie",
    "finanzen",
    "freizeit",
    "gesundheit",
    "kriminalitat",
    "kultur",
    "mobilitat",
    "politik",
    "preise",
    "soziales",
    "tourismus",
    "umwelt",
    "verwaltung",
    "volkswirtschaft",
];

/// Datastore resource ids of frequently updated sources.
pub mod resources {
    /// UGZ hourly meteo measurements.
    pub const METEO: &str = "f9aa1373-404f-443b-b623-03ff02d2d0b7";
    /// UGZ hourly air quality measurements.
    pub const AIR_QUALITY: &str = "90410203-4b4f-4a65-9015-1fca2792e04d";
    pub const WATER_TIEFENBRUNNEN: &str = "f86b3581-6fbc-4337-ab1a-b6ead9d15daf";
    pub const WATER_MYTHENQUAI: &str = "61e26c94-c521-473f-b7bf-bb0d73f21e9f";
    /// Bahnhofstrasse pedestrian counters.
    pub const PEDESTRIANS: &str = "ec1fc740-8e54-4116-aab7-3394575b4666";
    pub const VBZ_PASSENGERS: &str = "38b0c1e5-1f4e-444d-975c-61a462aa8ca6";
    pub const VBZ_LINES: &str = "463f92e0-5b20-44b3-b27f-59499e331e8d";
    pub const VBZ_STOPS: &str = "948b6347-8988-4705-9b08-45f0208a15da";
}

/// XML namespaces of the parliamentary records service.
pub mod namespaces {
    pub const SEARCH: &str = "http://www.cmiag.ch/cdws/searchDetailResponse";
    pub const BUSINESS: &str = "http://www.cmiag.ch/cdws/Geschaeft";
    pub const CONTACT: &str = "http://www.cmiag.ch/cdws/Kontakt";
    pub const MANDATE: &str = "http://www.cmiag.ch/cdws/Behoerdenmandat";
}
