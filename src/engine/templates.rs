//! Fixed reply templates for each step transition and qualification path.

/// Opening message; also asks for the role so the next answer can be
/// consumed as one.
pub const GREETING: &str = "Hello! I am the Ambassador Fellowship Program Assistant. \
I help IT leaders understand if our global community is the right fit for their career goals. \
To get started, could you share your current professional title or role?";

pub const ASK_EXPERIENCE: &str =
    "Thank you. And how many years of professional experience do you have?";

/// Re-prompt when no number could be parsed from the experience answer.
pub const RETRY_EXPERIENCE: &str =
    "Could you please specify the number of years of experience you have (e.g., 15)?";

pub const ASK_LOCATION: &str = "Great. Which city and country are you currently based in?";

pub const ASK_TEAM_LEADERSHIP: &str =
    "Do you currently lead teams or influence high-level technology decisions? (Yes/No)";

pub const ASK_INTEREST: &str = "Understood. Finally, what are you primarily looking for? \
(e.g., Networking, Consulting, Leadership Brand, Career Security)";

pub const POTENTIAL_ANNOUNCEMENT: &str = "Thank you for sharing. You have a strong profile, \
though typically our Ambassadors have slightly more seniority or specialized focus. \
However, we have a 'Rising Leaders' track. \
Would you be interested in resources to help you bridge that gap?";

pub const NOT_QUALIFIED_ANNOUNCEMENT: &str = "Thank you for your interest. At this moment, \
the Ambassador Program is strictly reserved for senior C-level executives with 15+ years of experience. \
However, we have an open community newsletter ensuring you stay tailored to our updates. \
Would you like me to subscribe you?";

/// Steady-state reply for leads that did not qualify.
pub const DEFLECTION: &str = "I appreciate your enthusiasm. \
For now, please check our website at zocgroup.com for general updates.";

/// Shown in place of a knowledge base answer when the lookup fails.
pub const KB_FALLBACK: &str = "I apologize, I'm having trouble reaching our knowledge base \
right now. Please try again in a moment.";

/// Congratulatory announcement for a qualified lead.
pub fn qualified_announcement(role: &str, years: u32) -> String {
    format!(
        "Thank you deeply for sharing. Based on your profile as a {role} with {years} years of experience, \
you appear to be an excellent match for the Ambassador Fellowship Program.\n\n\
Our program lets you build a global personal brand and creates alternative income streams \
while you keep your current job. Would you like to know more about how it works?"
    )
}

/// Booking instructions with the external scheduling link.
pub fn booking_instructions(link: &str) -> String {
    format!(
        "Excellent. Given your background, I'd like to arrange a priority conversation with our Program Mentor. \
This call will cover:\n\
1. How to structure your 'Virtual CxO' portfolio.\n\
2. Compensation models for Ambassadors.\n\
3. Steps to secure your geography.\n\n\
Please schedule your time here: [Book Mentor Call]({link})"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_announcement_interpolates_profile() {
        let text = qualified_announcement("CIO", 20);
        assert!(text.contains("as a CIO with 20 years of experience"));
        assert!(text.contains("excellent match"));
    }

    #[test]
    fn booking_instructions_carry_the_link() {
        let text = booking_instructions("https://calendly.com/example/interview");
        assert!(text.contains("https://calendly.com/example/interview"));
        assert!(text.contains("Program Mentor"));
    }
}
