//! Starter files written by `graft init`

use std::fs;
use std::io;
use std::path::Path;

/// Entries `init` makes sure `.gitignore` carries
pub const GITIGNORE_ENTRIES: &[&str] = &["graft-compose.yml", ".graft/", "env/"];

/// Starter manifest: a frontend and a backend, both built on the host and
/// attached to the shared `graft-public` network.
pub fn compose_template(name: &str, domain: &str) -> String {
    format!(
        r#"# Graft compose file for {name}
# Domain: {domain}
name: {name}
x-graft-domain: {domain}

services:
  frontend:
    build:
      context: ./frontend
      dockerfile: Dockerfile
    environment:
      - NODE_ENV=production
      - PORT=3000
    labels:
      # localbuild | serverbuild
      - "graft.mode=serverbuild"
      - "traefik.enable=true"
      - "traefik.http.routers.{name}-frontend.rule=Host(`{domain}`)"
      - "traefik.http.routers.{name}-frontend.priority=1"
      - "traefik.http.routers.{name}-frontend.service={name}-frontend-service"
      - "traefik.http.services.{name}-frontend-service.loadbalancer.server.port=3000"
      - "traefik.http.routers.{name}-frontend.entrypoints=websecure"
      - "traefik.http.routers.{name}-frontend.tls.certresolver=letsencrypt"
    networks:
      - graft-public
    restart: unless-stopped

  backend:
    build:
      context: ./backend
      dockerfile: Dockerfile
    environment:
      # Secrets from `graft secret set` are substituted at sync time
      # - DB_URL=${{DB_URL}}
      - PORT=5000
    labels:
      - "graft.mode=serverbuild"
      - "traefik.enable=true"
      # {domain}/api/* reaches the backend with the /api prefix stripped
      - "traefik.http.routers.{name}-backend.rule=Host(`{domain}`) && PathPrefix(`/api`)"
      - "traefik.http.routers.{name}-backend.priority=2"
      - "traefik.http.middlewares.{name}-backend-strip.stripprefix.prefixes=/api"
      - "traefik.http.routers.{name}-backend.middlewares={name}-backend-strip"
      - "traefik.http.routers.{name}-backend.service={name}-backend-service"
      - "traefik.http.services.{name}-backend-service.loadbalancer.server.port=5000"
      - "traefik.http.routers.{name}-backend.entrypoints=websecure"
      - "traefik.http.routers.{name}-backend.tls.certresolver=letsencrypt"
    networks:
      - graft-public
    restart: unless-stopped

networks:
  graft-public:
    external: true
"#
    )
}

/// Write the starter manifest unless one exists. Returns whether it wrote.
pub fn write_manifest_if_absent(path: &Path, name: &str, domain: &str) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, compose_template(name, domain))?;
    Ok(true)
}

/// Append the missing [`GITIGNORE_ENTRIES`]. Returns the entries added.
pub fn ensure_gitignore(project_root: &Path) -> io::Result<Vec<&'static str>> {
    let path = project_root.join(".gitignore");
    let existing = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let missing: Vec<&'static str> = GITIGNORE_ENTRIES
        .iter()
        .copied()
        .filter(|entry| !existing.lines().any(|line| line.trim() == *entry))
        .collect();
    if missing.is_empty() {
        return Ok(missing);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for entry in &missing {
        content.push_str(entry);
        content.push('\n');
    }
    fs::write(&path, content)?;
    Ok(missing)
}
