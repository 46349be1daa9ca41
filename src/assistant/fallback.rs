//! Canned replies used when no provider is configured or the call fails

use super::context::HouseholdContext;

/// Share of the bill the optimization reply claims can be saved
const OPTIMIZE_SAVINGS_SHARE: f64 = 0.3;

/// Growth assumed by the prediction reply
const PREDICTED_GROWTH: f64 = 1.1;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackResponder;

impl FallbackResponder {
    /// Routes on the first keyword found, in the order save, bill, predict, optimize.
    pub fn respond(&self, message: &str, ctx: &HouseholdContext) -> String {
        let lowered = message.to_lowercase();
        let currency = &ctx.currency;

        if lowered.contains("save") {
            format!(
                "💡 To save energy in {}:\n• Set AC to 24°C (saves 20%)\n• Use LED bulbs (80% less energy)\n• Unplug devices when not in use\n• Your potential savings: {currency}200/month",
                ctx.country
            )
        } else if lowered.contains("bill") {
            format!(
                "💰 Your monthly bill breakdown:\n• Energy: {currency}{:.0}\n• You're using {:.0} kWh/month\n• Peak usage devices: AC and Water Heater",
                ctx.monthly_bill, ctx.monthly_energy
            )
        } else if lowered.contains("predict") {
            format!(
                "📈 Based on your {} devices:\n• Next month: {:.0} kWh\n• Seasonal increase expected\n• Yearly cost: {currency}{:.0}",
                ctx.devices.len(),
                ctx.monthly_energy * PREDICTED_GROWTH,
                ctx.monthly_bill * 12.0
            )
        } else if lowered.contains("optimize") {
            format!(
                "⚡ Optimization recommendations:\n• Replace old bulbs with LEDs\n• Use AC timer (save 25%)\n• Upgrade to inverter appliances\n• Potential savings: {currency}{:.0}/month",
                ctx.monthly_bill * OPTIMIZE_SAVINGS_SHARE
            )
        } else {
            format!(
                "🤖 I'm your AI energy consultant for {}! I can help with:\n• Energy saving tips\n• Bill predictions\n• Device optimization\n• Cost reduction strategies\n\nWhat would you like to know?",
                ctx.country
            )
        }
    }
}
