use axum::{response::Html, routing::get, Router};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Report Card RAG - Corpus Manager</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; color: #1d1d1f; display: flex; min-height: 100vh; }
    aside { width: 280px; background: #f5f6f8; padding: 1.25rem; border-right: 1px solid #ddd; }
    main { flex: 1; padding: 1.5rem 2rem; }
    h1 { margin: 0 0 0.25rem 0; }
    .muted { color: #666; font-size: 0.9rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; background: #fff; }
    .metrics { display: flex; gap: 1rem; margin: 1rem 0; }
    .metric { flex: 1; border: 1px solid #ddd; border-radius: 8px; padding: 0.75rem; }
    .metric b { display: block; font-size: 1.4rem; }
    .tabs button { padding: 0.5rem 1rem; border: none; background: none; border-bottom: 2px solid transparent; cursor: pointer; }
    .tabs button.active { border-bottom-color: #1f77b4; font-weight: 600; }
    .tab { display: none; }
    .tab.active { display: block; }
    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 0.4rem; border-bottom: 1px solid #eee; }
    input, select { padding: 0.4rem; }
    button { padding: 0.45rem 0.9rem; cursor: pointer; }
    button.danger { background: #c62828; color: #fff; border: none; border-radius: 4px; }
    .status { margin-top: 0.5rem; font-size: 0.9rem; }
    .error { color: #c62828; }
    .ok { color: #2e7d32; }
    .modal { position: fixed; inset: 0; background: rgba(0,0,0,0.4); display: none; align-items: center; justify-content: center; }
    .modal.open { display: flex; }
    .modal .card { width: 420px; }
    .charts img { width: 100%; max-width: 720px; display: block; margin-bottom: 1rem; }
  </style>
</head>
<body>
  <aside>
    <h3>Upload Documents</h3>
    <input id="fileInput" type="file" multiple />
    <p class="muted" id="uploadHint">Supported: loading...</p>
    <button id="uploadBtn">Upload</button>
    <div id="uploadStatus" class="status"></div>

    <h3>Corpus</h3>
    <div id="corpusInfo" class="muted">Loading...</div>
    <button id="refreshBtn">Refresh</button>

    <h3>Danger Zone</h3>
    <button class="danger" id="deleteAllBtn">Delete All Documents</button>
  </aside>

  <main>
    <h1>Report Card Corpus Manager</h1>
    <p class="muted">Upload, browse and delete the documents behind the report card assistant.</p>

    <div class="metrics">
      <div class="metric">Total Documents<b id="mTotal">-</b></div>
      <div class="metric">Total Size<b id="mSize">-</b></div>
      <div class="metric">File Types<b id="mTypes">-</b></div>
      <div class="metric">Latest Upload<b id="mLatest">-</b></div>
    </div>

    <div class="tabs">
      <button data-tab="documents" class="active">Documents</button>
      <button data-tab="analytics">Analytics</button>
      <button data-tab="bulk">Bulk Operations</button>
    </div>

    <section id="tab-documents" class="tab active card">
      <input id="search" placeholder="Search documents" />
      <select id="typeFilter"><option value="all">All types</option></select>
      <p class="muted" id="docCount"></p>
      <table>
        <thead><tr><th>Name</th><th>Type</th><th>Size</th><th>Created</th><th>Updated</th><th></th></tr></thead>
        <tbody id="docRows"></tbody>
      </table>
    </section>

    <section id="tab-analytics" class="tab card charts">
      <img data-chart="file-types" alt="Document types" />
      <img data-chart="sizes" alt="Document sizes" />
      <img data-chart="timeline" alt="Upload timeline" />
      <pre id="sizeSummary"></pre>
    </section>

    <section id="tab-bulk" class="tab card">
      <label><input type="checkbox" id="selectAll" /> Select all</label>
      <p class="muted" id="selectionInfo">0 selected</p>
      <table><tbody id="bulkRows"></tbody></table>
      <button class="danger" id="bulkDeleteBtn">Delete Selected</button>
      <div id="bulkStatus" class="status"></div>
    </section>
  </main>

  <div class="modal" id="confirmModal">
    <div class="card">
      <h3 id="confirmTitle">Confirm</h3>
      <p id="confirmText"></p>
      <input id="confirmInput" placeholder="Type DELETE ALL" style="display:none; width: 95%;" />
      <p class="muted">This action cannot be undone.</p>
      <button class="danger" id="confirmYes">Delete</button>
      <button id="confirmNo">Cancel</button>
    </div>
  </div>

  <script>
    const $ = (id) => document.getElementById(id);
    let documents = [];
    let pendingAction = null;

    async function api(path, options = {}) {
      const res = await fetch(path, options);
      const body = await res.json().catch(() => ({}));
      if (!res.ok) throw new Error(body.error || res.statusText);
      return body;
    }

    function setStatus(el, message, ok) {
      el.textContent = message;
      el.className = 'status ' + (ok ? 'ok' : 'error');
    }

    function formatSize(bytes) {
      if (!bytes) return '0 B';
      const units = ['B', 'KB', 'MB', 'GB', 'TB'];
      let i = 0; let size = bytes;
      while (size >= 1024 && i < units.length - 1) { size /= 1024; i++; }
      return size.toFixed(1) + ' ' + units[i];
    }

    function escapeHtml(text) {
      const div = document.createElement('div');
      div.textContent = text;
      return div.innerHTML;
    }

    function openConfirm(title, text, requireTyping, action) {
      $('confirmTitle').textContent = title;
      $('confirmText').textContent = text;
      $('confirmInput').value = '';
      $('confirmInput').style.display = requireTyping ? 'block' : 'none';
      pendingAction = { action, requireTyping };
      $('confirmModal').classList.add('open');
    }

    $('confirmNo').onclick = () => { pendingAction = null; $('confirmModal').classList.remove('open'); };
    $('confirmYes').onclick = async () => {
      if (!pendingAction) return;
      const typed = $('confirmInput').value;
      if (pendingAction.requireTyping && typed !== 'DELETE ALL') {
        $('confirmText').textContent = 'Type DELETE ALL exactly to confirm.';
        return;
      }
      const { action } = pendingAction;
      pendingAction = null;
      $('confirmModal').classList.remove('open');
      await action(typed);
    };

    async function loadCorpus() {
      try {
        const info = await api('/api/corpus');
        $('corpusInfo').innerHTML = escapeHtml(info.display_name) + '<br/>' +
          escapeHtml(info.location) + ' / ' + escapeHtml(info.embedding_model) + '<br/>chunks ' +
          info.chunk_size + ' / overlap ' + info.chunk_overlap;
        $('uploadHint').textContent = 'Supported: ' + info.supported_file_types.join(', ') +
          ' (max ' + info.max_file_size_mb + ' MB)';
      } catch (e) {
        $('corpusInfo').textContent = 'Corpus unavailable: ' + e.message;
      }
    }

    async function loadDocuments() {
      const params = new URLSearchParams({ search: $('search').value, file_type: $('typeFilter').value });
      try {
        const data = await api('/api/documents?' + params);
        documents = data.documents;
        $('docCount').textContent = 'Showing ' + data.filtered + ' of ' + data.total + ' documents';
        const current = $('typeFilter').value;
        $('typeFilter').innerHTML = '<option value="all">All types</option>' +
          data.file_types.map(t => '<option value="' + t + '">' + t.toUpperCase() + '</option>').join('');
        $('typeFilter').value = data.file_types.includes(current) ? current : 'all';
        $('docRows').innerHTML = documents.map(d =>
          '<tr><td>' + escapeHtml(d.display_name) + '</td><td>' + d.file_type + '</td><td>' + d.size +
          '</td><td>' + d.created + '</td><td>' + d.updated + '</td><td><button data-delete="' + d.id +
          '" data-label="' + escapeHtml(d.display_name) + '">Delete</button></td></tr>').join('');
        $('bulkRows').innerHTML = documents.map(d =>
          '<tr><td><input type="checkbox" class="pick" value="' + d.id + '" data-size="' + d.size_bytes +
          '" /></td><td>' + escapeHtml(d.display_name) + '</td><td>' + d.size + '</td></tr>').join('');
        updateSelection();
      } catch (e) {
        $('docCount').textContent = 'Failed to load documents: ' + e.message;
      }
    }

    async function loadAnalytics() {
      try {
        const data = await api('/api/analytics');
        $('mTotal').textContent = data.stats.total_documents;
        $('mSize').textContent = data.total_size;
        $('mTypes').textContent = Object.keys(data.stats.file_types).length;
        $('mLatest').textContent = data.stats.latest_upload ? data.stats.latest_upload.slice(0, 10) : 'Unknown';
        const s = data.size_summary;
        $('sizeSummary').textContent = 'Total ' + s.total_mb.toFixed(2) + ' MB, average ' +
          s.average_mb.toFixed(2) + ' MB, largest ' + s.largest_mb.toFixed(2) + ' MB, smallest ' +
          s.smallest_mb.toFixed(2) + ' MB';
        const stamp = Date.now();
        document.querySelectorAll('[data-chart]').forEach(img => {
          img.src = '/api/analytics/charts/' + img.dataset.chart + '?t=' + stamp;
        });
      } catch (e) {
        $('sizeSummary').textContent = 'Analytics unavailable: ' + e.message;
      }
    }

    function refresh() { loadDocuments(); loadAnalytics(); }

    function selectedIds() {
      return [...document.querySelectorAll('.pick:checked')];
    }

    function updateSelection() {
      const picked = selectedIds();
      const bytes = picked.reduce((sum, el) => sum + Number(el.dataset.size), 0);
      $('selectionInfo').textContent = picked.length + ' selected (' + formatSize(bytes) + ')';
    }

    document.querySelectorAll('.tabs button').forEach(btn => {
      btn.onclick = () => {
        document.querySelectorAll('.tabs button').forEach(b => b.classList.remove('active'));
        document.querySelectorAll('.tab').forEach(t => t.classList.remove('active'));
        btn.classList.add('active');
        $('tab-' + btn.dataset.tab).classList.add('active');
      };
    });

    $('search').oninput = loadDocuments;
    $('typeFilter').onchange = loadDocuments;
    $('refreshBtn').onclick = refresh;
    $('bulkRows').onchange = updateSelection;
    $('selectAll').onchange = (e) => {
      document.querySelectorAll('.pick').forEach(el => { el.checked = e.target.checked; });
      updateSelection();
    };

    $('docRows').onclick = (e) => {
      const id = e.target.dataset.delete;
      if (!id) return;
      openConfirm('Delete document', 'Delete ' + e.target.dataset.label + '?', false, async () => {
        try {
          await api('/api/documents/' + encodeURIComponent(id), { method: 'DELETE' });
          refresh();
        } catch (err) {
          alert('Delete failed: ' + err.message);
        }
      });
    };

    $('bulkDeleteBtn').onclick = () => {
      const names = selectedIds().map(el => el.value);
      if (names.length === 0) {
        setStatus($('bulkStatus'), 'Select at least one document.', false);
        return;
      }
      openConfirm('Delete selected', 'Delete ' + names.length + ' document(s)?', false, async () => {
        try {
          const report = await api('/api/documents/bulk-delete', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ names }),
          });
          setStatus($('bulkStatus'), 'Deleted ' + report.deleted + ' of ' + report.total +
            (report.failed ? ', ' + report.failed + ' failed' : ''), report.failed === 0);
          refresh();
        } catch (err) {
          setStatus($('bulkStatus'), err.message, false);
        }
      });
    };

    $('deleteAllBtn').onclick = () => {
      openConfirm('Delete ALL documents', 'Every document in the corpus will be removed.', true, async (typed) => {
        try {
          const report = await api('/api/documents/delete-all', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ confirmation: typed }),
          });
          alert('Deleted ' + report.deleted + ' of ' + report.total + ' documents');
          refresh();
        } catch (err) {
          alert('Delete all failed: ' + err.message);
        }
      });
    };

    $('uploadBtn').onclick = async () => {
      const files = [...$('fileInput').files];
      if (files.length === 0) {
        setStatus($('uploadStatus'), 'Choose at least one file.', false);
        return;
      }
      let uploaded = 0;
      const errors = [];
      for (const file of files) {
        const form = new FormData();
        form.append('file', file);
        try {
          await api('/api/documents', { method: 'POST', body: form });
          uploaded++;
        } catch (e) {
          errors.push(file.name + ': ' + e.message);
        }
      }
      setStatus($('uploadStatus'), 'Uploaded ' + uploaded + ' of ' + files.length +
        (errors.length ? '. ' + errors.join('; ') : ''), errors.length === 0);
      refresh();
    };

    loadCorpus();
    refresh();
  </script>
</body>
</html>"#)
}
