#![allow(dead_code)]

use async_trait::async_trait;
use firelens::controller::{ExclusivityController, Phase};
use firelens::display::MemoryMap;
use firelens::error::BackendError;
use firelens::loader::{LoaderSettings, OverlayLoader};
use firelens::models::fire::{Fire, FireFilter};
use firelens::models::overlay::OverlayKind;
use firelens::models::scenario::{FallbackFeature, Scenario, ScenarioLayers, ScenarioState};
use firelens::registry::LayerRegistry;
use firelens::traits::{Backend, RasterFetch};
use gdal::DriverManager;
use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::Notify;

pub enum Reply {
    Tiff(Vec<u8>),
    Status(u16),
    /// Waits for the gate before answering with the bytes.
    Held(Arc<Notify>, Vec<u8>),
}

/// Backend answering raster requests from a per-kind queue. An empty queue
/// answers 404.
#[derive(Default)]
pub struct ScriptedBackend {
    rasters: Mutex<HashMap<OverlayKind, VecDeque<Reply>>>,
    requests: Mutex<Vec<(OverlayKind, String)>>,
    layers: ScenarioLayers,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layers(layers: ScenarioLayers) -> Self {
        ScriptedBackend {
            layers,
            ..Default::default()
        }
    }

    pub fn push(&self, kind: OverlayKind, reply: Reply) {
        self.rasters
            .lock()
            .unwrap()
            .entry(kind)
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<(OverlayKind, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn fires(&self, _: &FireFilter) -> Result<Vec<Fire>, BackendError> {
        Err(BackendError::Request("offline".into()))
    }

    async fn scenario(&self, _: &ScenarioState) -> Result<Scenario, BackendError> {
        Ok(Scenario {
            layers: self.layers.clone(),
            ..Default::default()
        })
    }

    async fn raster(&self, kind: OverlayKind, fire_id: &str) -> Result<RasterFetch, BackendError> {
        self.requests
            .lock()
            .unwrap()
            .push((kind, fire_id.to_string()));
        let reply = self
            .rasters
            .lock()
            .unwrap()
            .get_mut(&kind)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Tiff(bytes)) => Ok(RasterFetch::Payload(bytes)),
            Some(Reply::Status(status)) => Ok(RasterFetch::Missing(status)),
            Some(Reply::Held(gate, bytes)) => {
                gate.notified().await;
                Ok(RasterFetch::Payload(bytes))
            }
            None => Ok(RasterFetch::Missing(404)),
        }
    }

    async fn ask(&self, _: &str, _: &str) -> Result<String, BackendError> {
        Ok("Seed native grasses on the upper slopes.".into())
    }
}

pub struct Harness {
    pub map: Arc<MemoryMap>,
    pub backend: Arc<ScriptedBackend>,
    pub controller: Arc<ExclusivityController>,
}

pub fn harness(backend: ScriptedBackend) -> Harness {
    let map = Arc::new(MemoryMap::new(256));
    let backend = Arc::new(backend);
    let registry = LayerRegistry::new(map.clone());
    let loader = OverlayLoader::new(backend.clone(), map.clone(), LoaderSettings::default());
    let controller = ExclusivityController::new(registry, Arc::new(loader));
    Harness {
        map,
        backend,
        controller: Arc::new(controller),
    }
}

pub async fn harness_for_fire(backend: ScriptedBackend, fire_id: &str) -> Harness {
    let h = harness(backend);
    h.controller.set_fire(Some(fire_id.to_string())).await;
    h
}

/// Polls until the controller is loading `kind`.
pub async fn wait_loading(controller: &ExclusivityController, kind: OverlayKind) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Phase::Loading { requested, .. } = controller.phase().await {
                if requested == kind {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("controller never started loading");
}

pub fn feature(lat: f64, lng: f64, intensity: f64) -> FallbackFeature {
    FallbackFeature {
        coords: Some([lat, lng]),
        radius: Some(15_000.0),
        color: Some("#ff4e1f".into()),
        intensity: Some(intensity),
    }
}

/// Single-band Float32 GeoTIFF in EPSG:4326 around Paradise, CA.
pub fn overlay_tiff(width: usize, height: usize) -> Vec<u8> {
    let data: Vec<f32> = (0..width * height).map(|i| (i % 6) as f32).collect();
    let tmp = TempDir::new().expect("failed to create temp dir");
    let path = tmp.path().join("overlay.tif");
    {
        let driver = DriverManager::get_driver_by_name("GTIFF").unwrap();
        let mut ds = driver
            .create_with_band_type::<f32, _>(path.to_str().unwrap(), width, height, 1)
            .unwrap();
        let sref = SpatialRef::from_epsg(4326).unwrap();
        ds.set_projection(&sref.to_wkt().unwrap()).unwrap();
        ds.set_geo_transform(&[-121.8, 0.001, 0.0, 39.9, 0.0, -0.001])
            .unwrap();
        let mut band = ds.rasterband(1).unwrap();
        band.set_no_data_value(Some(255.0)).unwrap();
        let mut buffer = Buffer::<f32>::new((width, height), data);
        band.write((0, 0), (width, height), &mut buffer).unwrap();
        ds.flush_cache().unwrap();
    }
    std::fs::read(&path).unwrap()
}
