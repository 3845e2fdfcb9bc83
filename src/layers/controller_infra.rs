//! ControllerInfraLayer: Controller link, container and upgrader tiles.
//!
//! Link sites are the free tiles within range 4 of the controller. They are
//! ranked by how many free tiles next to them are also within upgrade range
//! of the controller, then by ring, then by distance to the center. The first
//! site a path from the center can reach wins: the path ends next to the link
//! with the container, and the free tiles around the link become upgrader
//! positions.

use super::path_from_center;
use crate::constants::IMPASSABLE_COST;
use crate::error::LayoutError;
use crate::grid::*;
use crate::layer::*;
use crate::location::*;
use crate::structure::StructureVariant;
use log::*;
use std::cmp::Reverse;

const ROAD_LEVEL: u8 = 2;
const CONTAINER_LEVEL: u8 = 1;
const LINK_LEVEL: u8 = 5;

/// Farthest ring searched for a link site.
const LINK_RANGE: u8 = 4;
/// Controller upgrade range.
const UPGRADE_RANGE: u8 = 3;

pub struct ControllerInfraLayer;

struct LinkSite {
    link: Location,
    ring: u8,
    area: Vec<Location>,
}

fn link_sites(candidate: &Candidate, controller: Location, center: Location) -> Vec<LinkSite> {
    let options = PositionOptions::default();
    let mut sites: Vec<LinkSite> = (1..=LINK_RANGE)
        .flat_map(|ring| {
            candidate
                .grid
                .hollow_square_pos(controller, ring, options)
                .into_iter()
                .map(move |link| (ring, link))
        })
        .filter(|(_, link)| candidate.is_free(*link))
        .map(|(ring, link)| LinkSite {
            link,
            ring,
            area: candidate
                .grid
                .square_pos(link, 1, options)
                .into_iter()
                .filter(|l| candidate.is_free(*l) && l.distance_to(controller) <= UPGRADE_RANGE)
                .collect(),
        })
        .collect();

    sites.sort_by_key(|s| (Reverse(s.area.len()), s.ring, s.link.distance_to(center)));
    sites
}

impl LayoutLayer for ControllerInfraLayer {
    fn name(&self) -> &str {
        "controller_infra"
    }

    fn phase(&self) -> CandidatePhase {
        CandidatePhase::NetworkConnections
    }

    fn apply(&self, candidate: &mut Candidate, room: &RoomContext) -> Result<(), LayoutError> {
        let controller = *room
            .controllers
            .first()
            .ok_or(LayoutError::MissingObject("controller"))?;
        let center = candidate.require_landmark("center")?;

        let sites = link_sites(candidate, controller, center);
        let chosen = sites.into_iter().find_map(|site| {
            let result = path_from_center(candidate, room, site.link, 1, &[site.link]).ok()?;
            if result.path.len() < 2 {
                return None;
            }
            Some((site, result))
        });
        let Some((site, result)) = chosen else {
            debug!("Origin {:?}: no reachable controller link site", candidate.origin);
            return Err(LayoutError::NoControllerSite);
        };

        let (&container, roads) = result.path[1..]
            .split_last()
            .ok_or(LayoutError::NoControllerSite)?;

        candidate.place(StructureVariant::ControllerRoad, ROAD_LEVEL, roads)?;
        candidate.place(StructureVariant::ControllerContainer, CONTAINER_LEVEL, &[container])?;
        candidate.place(StructureVariant::ControllerLink, LINK_LEVEL, &[site.link])?;

        let upgraders: Vec<Location> = site
            .area
            .into_iter()
            .filter(|l| !result.path.contains(l))
            .take(room.config.upgrader_limit)
            .collect();

        // Only block upgrader tiles once the path is committed.
        for loc in &upgraders {
            candidate.grid.set_cost(*loc, IMPASSABLE_COST);
        }

        candidate.set_landmark("controller_container", container);
        candidate.set_landmark("controller_link", site.link);
        candidate.push_score("upgraders", -(upgraders.len() as f32), room.config.upgrade_bonus_weight);
        candidate.push_score("path_cost", result.cost as f32, room.config.terrain_penalty_weight);

        trace!(
            "Origin {:?}: controller link at {:?} (ring {}), {} upgraders",
            candidate.origin,
            site.link,
            site.ring,
            upgraders.len()
        );

        candidate.upgraders = upgraders;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::test_support::*;
    use crate::layers::RoadNetworkLayer;

    #[test]
    fn link_container_and_upgraders_near_controller() {
        let (mut candidate, room) = through_extensions();
        RoadNetworkLayer.apply(&mut candidate, &room).unwrap();
        ControllerInfraLayer.apply(&mut candidate, &room).unwrap();

        let controller = room.controllers[0];
        let link = candidate.get_landmark("controller_link").unwrap();
        let container = candidate.get_landmark("controller_container").unwrap();

        assert!(link.distance_to(controller) <= LINK_RANGE);
        assert_eq!(container.distance_to(link), 1);
        assert!(candidate.grid.has_variant(link, StructureVariant::ControllerLink));
        assert!(candidate.grid.has_variant(container, StructureVariant::ControllerContainer));

        assert!(!candidate.upgraders.is_empty());
        assert!(candidate.upgraders.len() <= room.config.upgrader_limit);
        for loc in &candidate.upgraders {
            assert_eq!(loc.distance_to(link), 1);
            assert!(loc.distance_to(controller) <= UPGRADE_RANGE);
            assert!(!candidate.grid.is_passable(*loc));
            assert!(candidate.grid.structures_at(*loc).is_empty());
        }

        assert_eq!(candidate.score_of("upgraders"), -(candidate.upgraders.len() as f32));
    }

    #[test]
    fn room_without_controller() {
        let (mut candidate, mut room) = through_extensions();
        room.controllers.clear();
        assert_eq!(
            ControllerInfraLayer.apply(&mut candidate, &room),
            Err(LayoutError::MissingObject("controller"))
        );
    }

    #[test]
    fn enclosed_controller_has_no_site() {
        let (mut candidate, room) = through_extensions();
        let controller = room.controllers[0];
        for loc in candidate.grid.hollow_square_pos(controller, 5, PositionOptions::any_tile()) {
            candidate.grid.set_cost(loc, IMPASSABLE_COST);
        }
        assert_eq!(
            ControllerInfraLayer.apply(&mut candidate, &room),
            Err(LayoutError::NoControllerSite)
        );
    }
}
