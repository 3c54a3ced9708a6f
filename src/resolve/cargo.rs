//! Dumping goods from a ship or wagon train.

use crate::error::EngineError;
use crate::resolve::handler::OrderHandler;
use crate::session::Session;
use crate::world::{CargoItem, Commodity, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpVerdict {
    Dump { slot: usize, commodity: Commodity, quantity: i32 },
    CannotCarry,
    NoCommodities,
    Cancelled,
}

impl DumpVerdict {
    pub const fn name(&self) -> &'static str {
        match self {
            DumpVerdict::Dump { .. } => "dump",
            DumpVerdict::CannotCarry => "cannot_carry",
            DumpVerdict::NoCommodities => "no_commodities",
            DumpVerdict::Cancelled => "cancelled",
        }
    }
}

/// Goods slots of a unit as `(slot index, commodity, quantity)`.
fn goods_slots(cargo: &[CargoItem]) -> Vec<(usize, Commodity, i32)> {
    cargo
        .iter()
        .enumerate()
        .filter_map(|(i, c)| match c {
            CargoItem::Goods { commodity, quantity } => Some((i, *commodity, *quantity)),
            CargoItem::Unit(_) => None,
        })
        .collect()
}

pub fn resolve_dump(session: &mut Session<'_>, unit: UnitId) -> Result<DumpVerdict, EngineError> {
    let u = session.world.unit(unit)?;
    let nation = u.nation;
    if u.composition.cargo_slots() == 0 {
        return Ok(DumpVerdict::CannotCarry);
    }
    let slots = goods_slots(&u.cargo);
    let Some(&(first_slot, first_commodity, first_quantity)) = slots.first() else {
        return Ok(DumpVerdict::NoCommodities);
    };
    if !session.is_human(nation) {
        return Ok(DumpVerdict::Dump {
            slot: first_slot,
            commodity: first_commodity,
            quantity: first_quantity,
        });
    }

    let options: Vec<String> = slots
        .iter()
        .map(|(_, commodity, quantity)| format!("{} {}", quantity, commodity.name()))
        .collect();
    let Some(pick) = session.ui.choose("Dump which cargo?", &options) else {
        return Ok(DumpVerdict::Cancelled);
    };
    let Some(&(slot, commodity, held)) = slots.get(pick) else {
        return Ok(DumpVerdict::Cancelled);
    };
    let prompt = format!("How much {} (1-{})?", commodity.name(), held);
    match session.ui.input_int(&prompt, 1, held) {
        Some(quantity) if quantity > 0 => Ok(DumpVerdict::Dump {
            slot,
            commodity,
            quantity: quantity.min(held),
        }),
        _ => Ok(DumpVerdict::Cancelled),
    }
}

pub struct DumpCargoHandler {
    unit: UnitId,
    verdict: Option<DumpVerdict>,
}

impl DumpCargoHandler {
    pub fn new(unit: UnitId) -> Self {
        DumpCargoHandler { unit, verdict: None }
    }
}

impl OrderHandler for DumpCargoHandler {
    fn unit(&self) -> UnitId {
        self.unit
    }

    fn confirm(&mut self, session: &mut Session<'_>) -> Result<bool, EngineError> {
        let verdict = resolve_dump(session, self.unit)?;
        log::debug!("{} dump cargo: {}", self.unit, verdict.name());
        let nation = session.world.unit(self.unit)?.nation;
        match verdict {
            DumpVerdict::CannotCarry => session.message(nation, "This unit carries no goods."),
            DumpVerdict::NoCommodities => session.message(nation, "There are no goods to dump."),
            _ => {}
        }
        self.verdict = Some(verdict);
        Ok(matches!(verdict, DumpVerdict::Dump { .. }))
    }

    fn perform(&mut self, session: &mut Session<'_>) -> Result<(), EngineError> {
        let Some(DumpVerdict::Dump { slot, commodity, quantity }) = self.verdict else {
            return Err(EngineError::Invariant("dump performed without a verdict".into()));
        };
        let u = session.world.unit_mut(self.unit)?;
        let remaining = match u.cargo.get_mut(slot) {
            Some(CargoItem::Goods { commodity: c, quantity: q }) if *c == commodity => {
                *q -= quantity.min(*q);
                *q
            }
            _ => {
                return Err(EngineError::Invariant(format!(
                    "cargo slot {} of {} no longer holds {}",
                    slot,
                    self.unit,
                    commodity.name()
                )))
            }
        };
        if remaining == 0 {
            u.cargo.remove(slot);
        }
        log::debug!("{} dumped {} {}", self.unit, quantity, commodity.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::handler::{run_order, OrderOutcome};
    use crate::testing::Harness;
    use crate::world::{BaseType, Composition, Coord, Nation, Order};

    fn loaded_wagon(h: &mut Harness, nation: Nation) -> UnitId {
        let wagon = h.unit(nation, Composition::of(BaseType::WagonTrain), Coord::new(1, 1));
        let cargo = &mut h.world.unit_mut(wagon).unwrap().cargo;
        cargo.push(CargoItem::Goods {
            commodity: Commodity::Furs,
            quantity: 100,
        });
        cargo.push(CargoItem::Goods {
            commodity: Commodity::Tools,
            quantity: 40,
        });
        wagon
    }

    #[test]
    fn human_picks_slot_and_amount() {
        let mut h = Harness::plains(4, 4);
        let wagon = loaded_wagon(&mut h, Nation::English);
        h.ui.answer_choice(1);
        h.ui.answer_int(15);
        assert_eq!(run_order(&mut h.session(), wagon, Order::DumpCargo).unwrap(), OrderOutcome::Performed);
        assert_eq!(
            h.world.unit(wagon).unwrap().cargo[1],
            CargoItem::Goods {
                commodity: Commodity::Tools,
                quantity: 25
            }
        );
    }

    #[test]
    fn ai_dumps_first_slot_entirely() {
        let mut h = Harness::plains(4, 4);
        let wagon = loaded_wagon(&mut h, Nation::French);
        run_order(&mut h.session(), wagon, Order::DumpCargo).unwrap();
        assert_eq!(
            h.world.unit(wagon).unwrap().cargo,
            vec![CargoItem::Goods {
                commodity: Commodity::Tools,
                quantity: 40
            }]
        );
    }

    #[test]
    fn dismissed_amount_cancels() {
        let mut h = Harness::plains(4, 4);
        let wagon = loaded_wagon(&mut h, Nation::English);
        h.ui.answer_choice(0);
        assert_eq!(run_order(&mut h.session(), wagon, Order::DumpCargo).unwrap(), OrderOutcome::Cancelled);
        assert_eq!(h.world.unit(wagon).unwrap().cargo.len(), 2);
    }

    #[test]
    fn empty_holds_are_refused() {
        let mut h = Harness::plains(4, 4);
        let wagon = h.unit(Nation::English, Composition::of(BaseType::WagonTrain), Coord::new(1, 1));
        let colonist = h.unit(Nation::English, Composition::colonist(), Coord::new(2, 2));
        let mut s = h.session();
        assert_eq!(resolve_dump(&mut s, wagon).unwrap(), DumpVerdict::NoCommodities);
        assert_eq!(resolve_dump(&mut s, colonist).unwrap(), DumpVerdict::CannotCarry);
    }
}
