//! Collision detection and combat resolution
//!
//! Everything is axis-aligned rectangle overlap. The passes run in a fixed
//! order because earlier outcomes change what later passes can see: an enemy
//! that rammed the player cannot also escape, and a pickup collected this tick
//! is already active for the power-up master check.

use glam::Vec2;

use super::progression::AchievementId;
use super::spawn::roll_power_up_drop;
use super::state::{Bullet, Enemy, GameEvent, PowerUpKind, SimState};
use crate::consts::*;

/// What happened during one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Enemy contacts with the player (shielded or not)
    pub player_hits: u32,
    /// Contacts soaked by a shield
    pub shield_absorbs: u32,
    pub escapes: u32,
    pub pickups: u32,
    /// Bullet impacts, fatal or not
    pub bullet_hits: u32,
    pub kills: u32,
    /// The run ended during this pass
    pub game_over: bool,
}

/// Run every combat pass in order. Stops right after the player pass if the
/// run ended there.
pub fn resolve_collisions(state: &mut SimState) -> CombatReport {
    let mut report = CombatReport::default();

    enemy_player_pass(state, &mut report);
    if report.game_over {
        return report;
    }
    escape_pass(state, &mut report);
    power_up_pass(state, &mut report);
    bullet_enemy_pass(state, &mut report);

    report
}

/// Enemies ramming the player
fn enemy_player_pass(state: &mut SimState, report: &mut CombatReport) {
    let mut rammed = Vec::new();
    for i in 0..state.enemies.len() {
        // A hit earlier in this pass grants invincibility to the rest of it
        if state.player.invincible || report.game_over {
            break;
        }
        if !state.enemies[i].rect().overlaps(&state.player.rect()) {
            continue;
        }

        let enemy = state.enemies[i].clone();
        rammed.push(enemy.id);
        report.player_hits += 1;

        if state.player.shield {
            state.player.shield = false;
            report.shield_absorbs += 1;
            let center = state.player.center();
            let count = state.config.shield_pop_particles;
            state.spawn_explosion(center, NEON_PURPLE, count);
            state.emit(GameEvent::PlayerHit { shielded: true });
            log::debug!("Shield absorbed {:?} #{}", enemy.kind, enemy.id);
        } else {
            state.emit(GameEvent::PlayerHit { shielded: false });
            if state.lose_life() {
                report.game_over = true;
            } else {
                state.player.invincible = true;
                state.player.invincible_ms = state.config.invincibility_ms;
                log::debug!("Player hit by {:?}, {} lives left", enemy.kind, state.lives);
            }
        }

        let count = state.config.explosion_particles;
        state.spawn_explosion(enemy.center(), enemy.color, count);
    }

    if !rammed.is_empty() {
        state.enemies.retain(|e| !rammed.contains(&e.id));
    }
}

/// Enemies that fell past the bottom edge cost points
fn escape_pass(state: &mut SimState, report: &mut CombatReport) {
    let bottom = state.viewport.y;
    let mut escaped = Vec::new();
    state.enemies.retain(|e| {
        if e.pos.y > bottom {
            escaped.push((e.id, e.kind));
            false
        } else {
            true
        }
    });

    for (id, kind) in escaped {
        report.escapes += 1;
        state.penalize(state.config.escape_penalty);
        state.emit(GameEvent::EnemyEscaped { kind });
        log::debug!("{:?} #{} escaped, score {}", kind, id, state.score);
    }
}

/// Player collecting power-ups
fn power_up_pass(state: &mut SimState, report: &mut CombatReport) {
    let player = state.player.rect();
    let mut collected = Vec::new();
    state.power_ups.retain(|p| {
        if p.rect().overlaps(&player) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });

    for kind in collected {
        report.pickups += 1;
        apply_power_up(state, kind);
    }
}

/// Grant a power-up's effect to the player
pub fn apply_power_up(state: &mut SimState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::TripleShot => {
            state.player.triple_shot = true;
            state.player.triple_shot_ms = state.config.triple_shot_ms;
        }
        PowerUpKind::Shield => {
            state.player.shield = true;
        }
    }
    state.emit(GameEvent::PowerUpCollected { kind });
    log::debug!("Collected {:?}", kind);

    if state.player.shield && state.player.triple_shot {
        state.unlock(AchievementId::PowerUpMaster);
    }
}

/// Each bullet damages at most one enemy: the first live overlapping one in
/// list order. Bullets are walked in order too, so an enemy killed by an
/// earlier bullet is no longer a target for later ones.
fn bullet_enemy_pass(state: &mut SimState, report: &mut CombatReport) {
    let enemies = &mut state.enemies;
    let mut killed = Vec::new();
    state.bullets.retain(|bullet| {
        let rect = bullet.rect();
        let Some(enemy) = enemies
            .iter_mut()
            .find(|enemy| enemy.hp > 0 && enemy.rect().overlaps(&rect))
        else {
            return true;
        };

        report.bullet_hits += 1;
        enemy.hp -= 1;
        if enemy.hp == 0 {
            killed.push(enemy.clone());
        }
        false
    });

    if killed.is_empty() {
        return;
    }
    state.enemies.retain(|e| e.hp > 0);
    for enemy in killed {
        report.kills += 1;
        destroy_enemy(state, enemy);
    }
}

/// Scoring, achievements, explosion and drop roll for a kill
fn destroy_enemy(state: &mut SimState, enemy: Enemy) {
    state.award(enemy.score_value);
    state.kills += 1;
    state.emit(GameEvent::EnemyDestroyed { kind: enemy.kind });
    log::debug!(
        "Destroyed {:?} #{} (+{}), kills {}",
        enemy.kind,
        enemy.id,
        enemy.score_value,
        state.kills
    );

    state.unlock(AchievementId::FirstBlood);
    if state.kills >= state.config.ace_pilot_kills {
        state.unlock(AchievementId::AcePilot);
    }

    let count = state.config.explosion_particles;
    state.spawn_explosion(enemy.center(), enemy.color, count);
    roll_power_up_drop(state, enemy.pos);
}

/// Fire from the player's nose if the cooldown has elapsed.
///
/// Returns the number of bullets created.
pub fn fire(state: &mut SimState, timestamp: f64) -> usize {
    if let Some(last) = state.last_shot_ms {
        if timestamp - last <= state.config.bullet_cooldown_ms {
            return 0;
        }
    }

    let spread = state.config.triple_shot_spread;
    let angles = if state.player.triple_shot {
        vec![0.0, -spread, spread]
    } else {
        vec![0.0]
    };

    let size = Vec2::new(state.config.bullet_width, state.config.bullet_height);
    let nose = Vec2::new(
        state.player.pos.x + state.player.size.x / 2.0 - size.x / 2.0,
        state.player.pos.y,
    );
    for &angle in &angles {
        let id = state.next_entity_id();
        state.bullets.push(Bullet {
            id,
            pos: nose,
            size,
            speed: state.config.bullet_speed,
            angle,
            color: NEON_BLUE,
        });
    }

    state.last_shot_ms = Some(timestamp);
    angles.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::sim::state::{EnemyKind, PowerUp, RunStatus};

    fn playing() -> SimState {
        let config = SimConfig {
            powerup_drop_chance: 0.0,
            ..Default::default()
        };
        let mut s = SimState::with_seed(config, Vec2::new(800.0, 600.0), 11);
        s.start_run();
        s.player.pos = Vec2::new(400.0, 500.0);
        s.drain_events();
        s
    }

    fn enemy_at(s: &mut SimState, pos: Vec2, hp: u32) -> u32 {
        let id = s.next_entity_id();
        let stats = EnemyKind::Basic.stats(1);
        s.enemies.push(Enemy {
            id,
            kind: EnemyKind::Basic,
            pos,
            size: stats.size,
            hp,
            max_hp: hp,
            speed: stats.speed,
            color: stats.color,
            score_value: stats.score_value,
        });
        id
    }

    fn bullet_at(s: &mut SimState, pos: Vec2) {
        let id = s.next_entity_id();
        s.bullets.push(Bullet {
            id,
            pos,
            size: Vec2::new(4.0, 15.0),
            speed: 8.0,
            angle: 0.0,
            color: NEON_BLUE,
        });
    }

    fn particles_at(s: &SimState, center: Vec2) -> usize {
        s.particles.iter().filter(|p| p.pos == center).count()
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let mut s = playing();
        s.player.shield = true;
        enemy_at(&mut s, Vec2::new(410.0, 510.0), 1);

        let report = resolve_collisions(&mut s);

        assert_eq!(report.shield_absorbs, 1);
        assert!(!s.player.shield);
        assert_eq!(s.lives, 3);
        assert!(!s.player.invincible);
        assert!(s.enemies.is_empty());
        assert_eq!(particles_at(&s, Vec2::new(430.0, 530.0)), EXPLOSION_PARTICLES);
        assert_eq!(particles_at(&s, s.player.center()), SHIELD_POP_PARTICLES);
    }

    #[test]
    fn test_unshielded_hit_costs_life_and_grants_invincibility() {
        let mut s = playing();
        enemy_at(&mut s, Vec2::new(410.0, 510.0), 1);
        enemy_at(&mut s, Vec2::new(405.0, 505.0), 1);

        let report = resolve_collisions(&mut s);

        // The second enemy is ignored once invincibility kicks in
        assert_eq!(report.player_hits, 1);
        assert_eq!(s.lives, 2);
        assert!(s.player.invincible);
        assert_eq!(s.player.invincible_ms, INVINCIBILITY_MS);
        assert_eq!(s.enemies.len(), 1);
    }

    #[test]
    fn test_invincible_player_ignores_contact() {
        let mut s = playing();
        s.player.invincible = true;
        s.player.invincible_ms = 100.0;
        enemy_at(&mut s, Vec2::new(410.0, 510.0), 1);
        let report = resolve_collisions(&mut s);
        assert_eq!(report.player_hits, 0);
        assert_eq!(s.lives, 3);
        assert_eq!(s.enemies.len(), 1);
    }

    #[test]
    fn test_last_life_ends_run_and_stops_pass() {
        let mut s = playing();
        s.lives = 1;
        enemy_at(&mut s, Vec2::new(410.0, 510.0), 1);
        enemy_at(&mut s, Vec2::new(100.0, 700.0), 1); // would escape
        bullet_at(&mut s, Vec2::new(100.0, 10.0));

        let report = resolve_collisions(&mut s);

        assert!(report.game_over);
        assert_eq!(s.lives, 0);
        assert_eq!(s.status, RunStatus::GameOver);
        assert_eq!(report.escapes, 0);
        assert_eq!(s.enemies.len(), 1);
        let events = s.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_escape_penalty_floors_at_zero() {
        let mut s = playing();
        s.score = 20;
        enemy_at(&mut s, Vec2::new(100.0, 601.0), 1);
        let report = resolve_collisions(&mut s);
        assert_eq!(report.escapes, 1);
        assert_eq!(s.score, 0);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_enemy_at_bottom_edge_has_not_escaped() {
        let mut s = playing();
        enemy_at(&mut s, Vec2::new(100.0, 600.0), 1);
        let report = resolve_collisions(&mut s);
        assert_eq!(report.escapes, 0);
        assert_eq!(s.enemies.len(), 1);
    }

    #[test]
    fn test_power_up_pickup_and_master() {
        let mut s = playing();
        s.player.shield = true;
        s.power_ups.push(PowerUp {
            id: 99,
            kind: PowerUpKind::TripleShot,
            pos: Vec2::new(405.0, 505.0),
            size: Vec2::splat(30.0),
            speed: 2.0,
            color: NEON_RED,
        });

        let report = resolve_collisions(&mut s);

        assert_eq!(report.pickups, 1);
        assert!(s.power_ups.is_empty());
        assert!(s.player.triple_shot);
        assert_eq!(s.player.triple_shot_ms, TRIPLE_SHOT_MS);
        assert!(s.achievements.is_unlocked(AchievementId::PowerUpMaster));
    }

    #[test]
    fn test_shield_pickup_alone_is_not_master() {
        let mut s = playing();
        apply_power_up(&mut s, PowerUpKind::Shield);
        assert!(s.player.shield);
        assert!(!s.achievements.is_unlocked(AchievementId::PowerUpMaster));
    }

    #[test]
    fn test_bullet_hits_first_enemy_only() {
        let mut s = playing();
        let first = enemy_at(&mut s, Vec2::new(100.0, 100.0), 2);
        let second = enemy_at(&mut s, Vec2::new(90.0, 95.0), 2);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));

        let report = resolve_collisions(&mut s);

        assert_eq!(report.bullet_hits, 1);
        assert!(s.bullets.is_empty());
        let hp = |id| s.enemies.iter().find(|e| e.id == id).map(|e| e.hp);
        assert_eq!(hp(first), Some(1));
        assert_eq!(hp(second), Some(2));
    }

    #[test]
    fn test_kill_awards_score_and_first_blood() {
        let mut s = playing();
        enemy_at(&mut s, Vec2::new(100.0, 100.0), 1);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));

        let report = resolve_collisions(&mut s);

        assert_eq!(report.kills, 1);
        assert!(s.enemies.is_empty());
        assert_eq!(s.score, 100);
        assert_eq!(s.kills, 1);
        assert!(s.achievements.is_unlocked(AchievementId::FirstBlood));
        assert_eq!(particles_at(&s, Vec2::new(120.0, 120.0)), EXPLOSION_PARTICLES);
    }

    #[test]
    fn test_two_bullets_finish_tough_enemy() {
        let mut s = playing();
        enemy_at(&mut s, Vec2::new(100.0, 100.0), 2);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));
        bullet_at(&mut s, Vec2::new(120.0, 110.0));
        let report = resolve_collisions(&mut s);
        assert_eq!(report.bullet_hits, 2);
        assert_eq!(report.kills, 1);
        assert!(s.enemies.is_empty());
    }

    #[test]
    fn test_killed_enemy_is_not_hit_again() {
        let mut s = playing();
        enemy_at(&mut s, Vec2::new(100.0, 100.0), 1);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));
        bullet_at(&mut s, Vec2::new(115.0, 110.0));

        let report = resolve_collisions(&mut s);

        assert_eq!(report.bullet_hits, 1);
        assert_eq!(report.kills, 1);
        assert_eq!(s.bullets.len(), 1);
        assert_eq!(s.bullets[0].pos, Vec2::new(115.0, 110.0));
    }

    #[test]
    fn test_removals_keep_survivor_order() {
        let mut s = playing();
        enemy_at(&mut s, Vec2::new(100.0, 100.0), 1);
        let kept_a = enemy_at(&mut s, Vec2::new(300.0, 100.0), 3);
        enemy_at(&mut s, Vec2::new(400.0, 601.0), 1);
        enemy_at(&mut s, Vec2::new(500.0, 100.0), 1);
        let kept_b = enemy_at(&mut s, Vec2::new(700.0, 100.0), 3);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));
        bullet_at(&mut s, Vec2::new(20.0, 300.0));
        bullet_at(&mut s, Vec2::new(510.0, 110.0));

        let report = resolve_collisions(&mut s);

        assert_eq!(report.kills, 2);
        assert_eq!(report.escapes, 1);
        let ids: Vec<u32> = s.enemies.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![kept_a, kept_b]);
        assert_eq!(s.bullets.len(), 1);
        assert_eq!(s.bullets[0].pos, Vec2::new(20.0, 300.0));
    }

    #[test]
    fn test_ace_pilot_at_fifty_kills() {
        let mut s = playing();
        s.kills = 49;
        enemy_at(&mut s, Vec2::new(100.0, 100.0), 1);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));
        resolve_collisions(&mut s);
        assert!(s.achievements.is_unlocked(AchievementId::AcePilot));
    }

    #[test]
    fn test_kill_drop_lands_at_enemy_position() {
        let mut s = playing();
        s.config.powerup_drop_chance = 1.0;
        enemy_at(&mut s, Vec2::new(100.0, 100.0), 1);
        bullet_at(&mut s, Vec2::new(110.0, 110.0));
        resolve_collisions(&mut s);
        assert_eq!(s.power_ups.len(), 1);
        assert_eq!(s.power_ups[0].pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_fire_single_and_cooldown() {
        let mut s = playing();
        assert_eq!(fire(&mut s, 1000.0), 1);
        assert_eq!(s.bullets[0].pos, Vec2::new(418.0, 500.0));
        assert_eq!(fire(&mut s, 1200.0), 0);
        assert_eq!(fire(&mut s, 1201.0), 1);
        assert_eq!(s.bullets.len(), 2);
    }

    #[test]
    fn test_fire_triple_shot_angles() {
        let mut s = playing();
        s.player.triple_shot = true;
        s.player.triple_shot_ms = TRIPLE_SHOT_MS;
        assert_eq!(fire(&mut s, 500.0), 3);
        let mut angles: Vec<f32> = s.bullets.iter().map(|b| b.angle).collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(angles, vec![-0.2, 0.0, 0.2]);
    }
}
