use super::LayoutEngine;

/// Steps the repulsion charge down by a fixed amount per request.
#[derive(Clone, Copy, Debug)]
pub struct ChargeController {
    decrement: f32,
    decreases: u32,
}

impl ChargeController {
    pub fn new(decrement: f32) -> Self {
        Self {
            decrement: decrement.abs(),
            decreases: 0,
        }
    }

    pub fn decreases(&self) -> u32 {
        self.decreases
    }

    /// Lowers the engine's charge by one decrement and returns the new value.
    /// The caller is responsible for restarting the simulation.
    pub fn decrease_charge(&mut self, engine: &mut LayoutEngine) -> f32 {
        let charge = engine.charge() - self.decrement;
        engine.lower_charge(charge);
        self.decreases += 1;
        tracing::info!(charge, decreases = self.decreases, "charge decreased");
        charge
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConfig;

    #[test]
    fn repeated_decreases_are_linear() {
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        let mut controller = ChargeController::new(10.0);

        let mut last = engine.charge();
        for _ in 0..7 {
            let charge = controller.decrease_charge(&mut engine);
            assert!(charge < last);
            last = charge;
        }

        assert_eq!(engine.charge(), -100.0 - 10.0 * 7.0);
        assert_eq!(controller.decreases(), 7);
    }

    #[test]
    fn negative_decrement_still_lowers_charge() {
        let mut engine = LayoutEngine::new(LayoutConfig::default());
        let mut controller = ChargeController::new(-10.0);

        controller.decrease_charge(&mut engine);
        assert_eq!(engine.charge(), -110.0);
    }
}
