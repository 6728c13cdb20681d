// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier via crossterm et traduit les touches en prédicats simples
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Polling avec timeout : la boucle principale reste réactive
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Aucun événement pendant le délai (ou événement ignoré)
    Tick,

    /// Le terminal a changé de taille : il faut redessiner
    Resize,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    /// Délai d'attente maximum d'un événement
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un délai de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au maximum `tick_rate`
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            CrosstermEvent::Resize(_, _) => Ok(Event::Resize),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : KeyEvent -> action
// ============================================================================

/// Applique un prédicat au KeyCode si l'événement est une touche
///
/// CONCEPT RUST : Closures génériques
/// - F: Fn(KeyCode) -> bool évite de répéter le `if let Event::Key`
fn key_matches<F: Fn(KeyCode) -> bool>(event: &Event, predicate: F) -> bool {
    match event {
        Event::Key(key) => predicate(key.code),
        _ => false,
    }
}

/// 'q' : quitter (avec confirmation)
pub fn is_quit_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Échap : retour au dashboard
pub fn is_escape_event(event: &Event) -> bool {
    key_matches(event, |code| code == KeyCode::Esc)
}

/// Espace : bascule du widget / retour au dashboard
pub fn is_space_event(event: &Event) -> bool {
    key_matches(event, |code| code == KeyCode::Char(' '))
}

/// Entrée : ouvre le graphique en chandeliers
pub fn is_enter_event(event: &Event) -> bool {
    key_matches(event, |code| code == KeyCode::Enter)
}

/// ↑ ou 'k' (vim) : contrôle précédent
pub fn is_up_event(event: &Event) -> bool {
    key_matches(event, |code| {
        matches!(code, KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    })
}

/// ↓ ou 'j' (vim) : contrôle suivant
pub fn is_down_event(event: &Event) -> bool {
    key_matches(event, |code| {
        matches!(code, KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    })
}

/// → ou 'l' (vim) : valeur suivante
pub fn is_right_event(event: &Event) -> bool {
    key_matches(event, |code| {
        matches!(code, KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L'))
    })
}

/// ← ou 'h' (vim) : valeur précédente
pub fn is_left_event(event: &Event) -> bool {
    key_matches(event, |code| {
        matches!(code, KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H'))
    })
}

/// 'r' : recharger les données
pub fn is_reload_event(event: &Event) -> bool {
    key_matches(event, |code| matches!(code, KeyCode::Char('r') | KeyCode::Char('R')))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_vim_keys() {
        assert!(is_up_event(&key(KeyCode::Char('k'))));
        assert!(is_down_event(&key(KeyCode::Down)));
        assert!(is_left_event(&key(KeyCode::Char('h'))));
        assert!(is_right_event(&key(KeyCode::Right)));
        assert!(is_right_event(&key(KeyCode::Char('L'))));
        assert!(is_left_event(&key(KeyCode::Char('H'))));
        assert!(is_down_event(&key(KeyCode::Char('J'))));
        assert!(!is_left_event(&key(KeyCode::Char('L'))));
    }

    #[test]
    fn test_other_keys() {
        assert!(is_reload_event(&key(KeyCode::Char('r'))));
        assert!(is_space_event(&key(KeyCode::Char(' '))));
        assert!(is_enter_event(&key(KeyCode::Enter)));
        assert!(is_escape_event(&key(KeyCode::Esc)));
        assert!(!is_escape_event(&Event::Resize));
    }
}
