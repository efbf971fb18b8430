// src/handlers/ui.rs
//! Single-page front end wired to the JSON endpoints. Presentation is
//! deliberately minimal; the gating lives server-side.

use axum::{response::Html, routing::get, Router};

pub fn ui_routes() -> Router {
    Router::new().route("/", get(index_page))
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r###"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PromptCut - Script to Image Prompts</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; line-height: 1.6; }
        textarea { width: 100%; min-height: 220px; }
        pre { background: #f8f9fa; padding: 1rem; white-space: pre-wrap; }
        .error { color: #dc3545; }
        .row { margin: 1rem 0; }
    </style>
</head>
<body>
    <h1>PromptCut</h1>
    <p>Paste a video script and get per-minute image prompts.</p>

    <div class="row">
        <label for="script">Your script or transcription</label><br>
        <textarea id="script" placeholder="Paste your text here..."></textarea>
        <div><span id="word-count">0</span> words</div>
    </div>

    <div class="row">
        <label for="provider">Provider</label>
        <select id="provider"></select>
        <label for="ipm">Images per minute</label>
        <input id="ipm" type="number" min="1" max="10" value="2">
    </div>

    <div class="row">
        <button id="generate">Generate Prompts</button>
        <button id="download" disabled>Download</button>
        <span id="message" class="error"></span>
    </div>

    <pre id="result" hidden></pre>

    <script>
        const scriptInput = document.getElementById('script');
        const providerSelect = document.getElementById('provider');
        const generateButton = document.getElementById('generate');
        const downloadButton = document.getElementById('download');
        const message = document.getElementById('message');
        const result = document.getElementById('result');

        fetch('/api/providers')
            .then(r => r.json())
            .then(data => {
                for (const provider of data.providers) {
                    const option = document.createElement('option');
                    option.value = provider;
                    option.textContent = provider;
                    providerSelect.appendChild(option);
                }
                if (data.providers.length === 0) {
                    message.textContent = 'No providers configured.';
                    generateButton.disabled = true;
                }
            });

        scriptInput.addEventListener('input', () => {
            const words = scriptInput.value.split(/\s+/).filter(Boolean).length;
            document.getElementById('word-count').textContent = words;
        });

        generateButton.addEventListener('click', async () => {
            generateButton.disabled = true;
            message.textContent = '';
            try {
                const response = await fetch('/api/generate', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({
                        text: scriptInput.value,
                        images_per_minute: parseInt(document.getElementById('ipm').value, 10),
                        provider: providerSelect.value,
                    }),
                });
                const data = await response.json();
                if (!response.ok) {
                    message.textContent = data.message || 'Generation failed.';
                    return;
                }
                result.hidden = false;
                result.textContent = data.processed_text;
                downloadButton.disabled = false;
            } catch (e) {
                message.textContent = 'Generation failed.';
            } finally {
                generateButton.disabled = false;
            }
        });

        downloadButton.addEventListener('click', () => {
            window.location.href = '/api/output/download';
        });
    </script>
</body>
</html>
"###;
