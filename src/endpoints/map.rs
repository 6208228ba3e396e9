pub(super) const INDEX_HTML: &str = r#"<!DOCTYPE html>
  <html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0"/>
    <title>FireLens</title>
    <link
      rel="stylesheet"
      href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"
      integrity="sha256-p4NxAoJBhIIN+hmNHrzRCf9tD/miZyoHS5obTRR9BMY="
      crossorigin=""
    />
    <style>
      html, body { height: 100%; margin: 0; padding: 0; font-family: sans-serif; }
      #controls {
        position: absolute;
        top: 12px;
        left: 50px;
        z-index: 1000;
        background: white;
        padding: 8px;
        border-radius: 4px;
        box-shadow: 0 1px 4px rgba(0,0,0,0.3);
        line-height: 26px;
        max-width: 320px;
      }
      #legend {
        position: absolute;
        bottom: 24px;
        right: 12px;
        z-index: 1000;
        background: rgba(20, 20, 20, 0.85);
        color: white;
        padding: 8px 10px;
        border-radius: 4px;
        font-size: 13px;
        display: none;
      }
      .legend-swatch {
        display: inline-block;
        width: 14px;
        height: 14px;
        margin-right: 6px;
        vertical-align: middle;
      }
      #tip { font-size: 12px; color: #555; }
      #map { height: 100%; width: 100%; }
    </style>
  </head>
  <body>
    <div id="controls">
      <label for="fireSelect">Fire: </label>
      <select id="fireSelect"></select>
      <br />
      <label><input type="checkbox" data-layer="burnSeverity" /> Burn Severity</label><br />
      <label><input type="checkbox" data-layer="reburnRisk" /> Reburn Risk</label><br />
      <label><input type="checkbox" data-layer="bestNextSteps" /> Best Next Steps</label><br />
      <label for="timeline">Timeline: </label>
      <input type="range" id="timeline" min="0" max="4" step="1" value="2" />
      <div id="stage"></div>
      <div id="tip"></div>
    </div>
    <div id="legend"></div>
    <div id="map"></div>

    <script
      src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
      integrity="sha256-20nQCchB9co0qIjJZRGuk2/Z9VM+kNiyxNV1lvTlZBo="
      crossorigin=""
    ></script>

    <script>
      const fireSelect = document.getElementById('fireSelect');
      const toggles = document.querySelectorAll('[data-layer]');
      const timeline = document.getElementById('timeline');
      const legend = document.getElementById('legend');
      const stage = document.getElementById('stage');
      const tip = document.getElementById('tip');

      const map = L.map('map').setView([39.73, -121.6], 9);
      L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
        maxZoom: 19,
        attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors'
      }).addTo(map);

      // everything the server reports as active is drawn into this group
      const overlayGroup = L.layerGroup().addTo(map);

      const rgba = ([r, g, b, a]) => `rgba(${r}, ${g}, ${b}, ${(a / 255).toFixed(2)})`;

      function render(view) {
        overlayGroup.clearLayers();
        const snapshot = view.snapshot;
        if (snapshot.overlay) {
          const { layer, opacity, tiles } = snapshot.overlay;
          tiles.forEach(({ col, row, bounds }) => {
            L.imageOverlay(`/overlay/${layer}/${col}/${row}.png`, bounds, { opacity })
              .addTo(overlayGroup);
          });
        }
        snapshot.markers.forEach(m => {
          L.circle(m.center, {
            radius: m.radius_m,
            color: rgba(m.stroke),
            fillColor: rgba([m.fill[0], m.fill[1], m.fill[2], 255]),
            fillOpacity: m.fill[3] / 255,
            weight: m.weight,
          }).addTo(overlayGroup);
        });

        toggles.forEach(t => { t.checked = view.legend.checked.includes(t.dataset.layer); });

        if (view.legend.visible) {
          legend.innerHTML = `<strong>${view.legend.title}</strong><br/>` +
            view.legend.entries.map(e =>
              `<div title="${e.tooltip}"><span class="legend-swatch" style="background:${e.colour};` +
              `${e.border ? 'border:' + e.border : ''}"></span>${e.label}</div>`
            ).join('');
          legend.style.display = 'block';
        } else {
          legend.style.display = 'none';
        }
        stage.textContent = `${view.stage.label} · ${view.stage.description}`;
      }

      async function refresh() {
        const res = await fetch('/layers');
        render(await res.json());
      }

      async function initFires() {
        const res = await fetch('/fires');
        const data = await res.json();
        fireSelect.innerHTML = '';
        data.fires.forEach(({ id, name, state }) => {
          const opt = document.createElement('option');
          opt.value = id;
          opt.textContent = `${name} (${state})`;
          fireSelect.appendChild(opt);
        });
        const scenario = await (await fetch('/scenario')).json();
        fireSelect.value = scenario.state.fireId;
        timeline.value = scenario.state.timeline;
      }

      toggles.forEach(toggle => {
        toggle.addEventListener('change', async () => {
          const res = await fetch(`/layers/${toggle.dataset.layer}`, {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ checked: toggle.checked }),
          });
          const body = await res.json();
          tip.textContent = body.tip;
          render(body.layers);
        });
      });

      fireSelect.addEventListener('change', async () => {
        const res = await fetch(`/fires/${fireSelect.value}/select`, { method: 'POST' });
        const body = await res.json();
        const fire = body.scenario.fire;
        if (fire && fire.center) {
          map.flyTo(fire.center, 9, { duration: 1 });
        } else if (fire && fire.lat && fire.lng) {
          map.flyTo([fire.lat, fire.lng], 9, { duration: 1 });
        }
        render(body.layers);
      });

      timeline.addEventListener('change', async () => {
        const res = await fetch('/scenario', {
          method: 'PUT',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ timeline: parseInt(timeline.value, 10) }),
        });
        render((await res.json()).layers);
      });

      map.on('zoomend', async () => {
        const res = await fetch('/viewport/zoom', { method: 'POST' });
        render(await res.json());
      });

      initFires().then(refresh).catch(console.error);
    </script>
  </body>
  </html>
"#;
